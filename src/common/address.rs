/// Port assumed for servers given without one.
pub const DEFAULT_SERVER_PORT: u16 = 80;

const UNIX_PREFIX: &str = "unix:";

/// Formats a server address as `host:port`, adding the default port when
/// none is present. Unix socket addresses are returned unchanged.
///
/// The check is purely syntactic: nothing is resolved or validated.
pub fn normalize_address(address: &str) -> String {
    if has_port(address) || address.starts_with(UNIX_PREFIX) {
        return address.to_string();
    }

    // A bare IPv6 literal gets brackets so the appended port stays unambiguous.
    if address.contains(':') && !address.ends_with(']') {
        return format!("[{address}]:{DEFAULT_SERVER_PORT}");
    }

    format!("{address}:{DEFAULT_SERVER_PORT}")
}

fn has_port(address: &str) -> bool {
    if address.matches(':').count() == 1 {
        return true;
    }

    match address.rsplit_once("]:") {
        Some((_, port)) => !port.is_empty() && !port.contains([':', ']']),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_and_port_is_unchanged() {
        assert_eq!(normalize_address("example.com:8080"), "example.com:8080");
    }

    #[test]
    fn ipv4_and_port_is_unchanged() {
        assert_eq!(normalize_address("127.0.0.1:8080"), "127.0.0.1:8080");
    }

    #[test]
    fn ipv6_and_port_is_unchanged() {
        assert_eq!(normalize_address("[::]:8080"), "[::]:8080");
        assert_eq!(normalize_address("[2001:db8::1]:443"), "[2001:db8::1]:443");
    }

    #[test]
    fn unix_socket_is_unchanged() {
        assert_eq!(
            normalize_address("unix:/path/to/socket"),
            "unix:/path/to/socket"
        );
    }

    #[test]
    fn host_without_port_gets_default_port() {
        assert_eq!(normalize_address("example.com"), "example.com:80");
    }

    #[test]
    fn ipv4_without_port_gets_default_port() {
        assert_eq!(normalize_address("127.0.0.1"), "127.0.0.1:80");
    }

    #[test]
    fn ipv6_without_port_gets_default_port() {
        assert_eq!(normalize_address("[::]"), "[::]:80");
        assert_eq!(normalize_address("::1"), "[::1]:80");
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let inputs = [
            "",
            "example.com",
            "example.com:8080",
            "127.0.0.1",
            "[::]",
            "[::]:8080",
            "::1",
            "[::1",
            "[a]:1]:2",
            "[::]:",
            "unix:/path/to/socket",
            "unix:",
            "a:b:c",
        ];

        for input in inputs {
            let once = normalize_address(input);
            assert_eq!(normalize_address(&once), once, "input {input:?}");
        }
    }
}
