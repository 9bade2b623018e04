use std::net::SocketAddr;
use std::time::Duration;
use anyhow::bail;


/// Configuration for one bounded probe run. `new()` provides the reference
///  defaults; callers override fields before passing the config on.
#[derive(Debug, Clone)]
pub struct ProberConfig {
    pub target: SocketAddr,
    /// number of probes to send; the run always completes this count
    pub attempts: usize,
    /// per-attempt window for the acknowledgment, after which the attempt is
    ///  recorded as timed out and the next one starts
    pub attempt_timeout: Duration,
}

impl ProberConfig {
    pub fn new(target: SocketAddr) -> ProberConfig {
        ProberConfig {
            target,
            attempts: 10,
            attempt_timeout: Duration::from_secs(1),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.attempt_timeout.is_zero() {
            bail!("attempt timeout must be non-zero");
        }
        Ok(())
    }
}


/// Configuration for a responder session.
#[derive(Debug, Clone)]
pub struct ResponderConfig {
    pub listen_addr: SocketAddr,
    /// probability in [0.0, 1.0] that a valid probe is silently discarded
    ///  instead of acknowledged (simulated packet loss)
    pub drop_probability: f64,
    /// duration of inactivity after which the responder terminates itself
    pub idle_timeout: Duration,
}

impl ResponderConfig {
    pub fn new(listen_addr: SocketAddr) -> ResponderConfig {
        ResponderConfig {
            listen_addr,
            drop_probability: 0.3,
            idle_timeout: Duration::from_secs(20),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.drop_probability) {
            bail!("drop probability must be between 0.0 and 1.0");
        }
        if self.idle_timeout.is_zero() {
            bail!("idle timeout must be non-zero");
        }
        Ok(())
    }
}
