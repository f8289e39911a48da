/* demos/demo.rs */

use edgeip::{Classifier, RangeRegistry, RequestInfo, in_range, resolve_address};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    println!("=== Edge IP Classification Examples ===\n");

    // Example 1: Resolver precedence
    example_1_precedence();

    // Example 2: Request relayed by the edge
    example_2_trusted_edge();

    // Example 3: Direct request carrying forged edge headers
    example_3_forged_headers();

    // Example 4: Custom range registry
    example_4_custom_registry();

    // Example 5: CGI-style server variables
    example_5_server_vars();

    println!("=== All examples completed! ===");
}

fn example_1_precedence() {
    println!("Example 1: Resolver precedence");

    let mut info = RequestInfo::default()
        .with_header("Client-IP", "1.2.3.4")
        .with_header("X-Forwarded-For", "5.6.7.8")
        .with_remote_addr("9.9.9.9");
    println!("All sources:          {}", resolve_address(&info));

    info.remove_header("client-ip");
    println!("Without Client-IP:    {}", resolve_address(&info));

    info.remove_header("x-forwarded-for");
    println!("Peer address only:    {}", resolve_address(&info));
    println!();
}

fn example_2_trusted_edge() {
    println!("Example 2: Request relayed by the edge");

    let info = RequestInfo::default()
        .with_remote_addr("173.245.48.1")
        .with_header("CF-Ray", "7d1c2a3b4c5d6e7f-AMS")
        .with_header("CF-Connecting-IP", "203.0.113.9");

    let identity = Classifier::new().classify(&info);
    println!("Trusted: {}", identity.is_trusted);
    println!("Reported address: {}", identity.reported_address);
    println!("Edge peer: {}", identity.peer_address);
    println!();
}

fn example_3_forged_headers() {
    println!("Example 3: Direct request carrying forged edge headers");

    let info = RequestInfo::default()
        .with_remote_addr("8.8.8.8")
        .with_header("CF-Connecting-IP", "<script>203.0.113.9</script>");

    let identity = Classifier::new().classify(&info);
    println!("Trusted: {}", identity.is_trusted);
    println!("Reported address: {}", identity.reported_address);
    println!();
}

fn example_4_custom_registry() {
    println!("Example 4: Custom range registry");

    let mut registry = RangeRegistry::new();
    registry.clear();
    if let Err(err) = registry.add(["10.0.0.0/8", "192.0.2.1"]) {
        println!("Could not add ranges: {}", err);
        return;
    }
    match registry.add(["172.16.0.0/12", "172.16.0.0/99"]) {
        Ok(_) => println!("Unexpectedly accepted a bad range"),
        Err(err) => println!("Rejected: {}", err),
    }

    println!("Registered ranges:");
    for range in registry.entries() {
        println!("  {}", range);
    }
    println!("10.1.2.3 in 10.0.0.0/8: {}", in_range("10.1.2.3", "10.0.0.0/8"));

    let classifier = Classifier::new().with_registry(registry);
    let info = RequestInfo::default()
        .with_remote_addr("10.20.30.40")
        .with_header("CF-Visitor", r#"{"scheme":"https"}"#)
        .with_header("CF-Connecting-IP", "198.51.100.77");
    println!("Classifier result: {}", classifier.ip(&info));
    println!();
}

fn example_5_server_vars() {
    println!("Example 5: CGI-style server variables");

    let info = RequestInfo::from_server_vars([
        ("REMOTE_ADDR", "162.158.10.10"),
        ("HTTP_CF_IPCOUNTRY", "NL"),
        ("HTTP_CF_CONNECTING_IP", "192.0.2.200"),
    ]);

    let classifier = Classifier::new();
    println!("Trusted: {}", classifier.is_trusted(&info));
    println!("Reported address: {}", classifier.ip(&info));
    println!("Address is valid IPv4: {}", classifier.is_valid(&info, None));
    println!();
}
