//! Identity of the local host, recorded as provenance of stored files.

use tracing::debug;

/// Preferred local IP address, falling back to the hostname when no
/// interface address can be determined.
pub fn origin_host() -> String {
    match local_ip_address::local_ip() {
        Ok(ip) => ip.to_string(),
        Err(e) => {
            debug!(error = %e, "no local IP address, using hostname as origin host");
            let hostname = gethostname::gethostname().to_string_lossy().into_owned();
            if hostname.is_empty() {
                "localhost".to_string()
            } else {
                hostname
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_host_is_never_empty() {
        assert!(!origin_host().is_empty());
    }
}
