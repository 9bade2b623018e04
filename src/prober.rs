use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::config::ProberConfig;
use crate::protocol::{Attempt, AttemptOutcome, ACKNOWLEDGMENT, MAX_DATAGRAM_SIZE, PROBE};


/// Sends a bounded sequence of liveness probes to a fixed endpoint, each
///  gated by its own timeout, and reports per-attempt outcomes.
///
/// Single-threaded and strictly sequential: one probe is in flight at a time,
///  and the only blocking point is the per-attempt receive. The socket is
///  bound once and reused across all attempts.
pub struct Prober {
    config: ProberConfig,
    socket: UdpSocket,
}

impl Prober {
    /// Binds the probe socket on an ephemeral port, matching the target's
    ///  address family. Bind failure is the only fatal error of a probe run.
    pub async fn bind(config: ProberConfig) -> anyhow::Result<Prober> {
        config.validate()?;
        let bind_addr = if config.target.is_ipv6() { "[::]:0" } else { "0.0.0.0:0" };
        let socket = UdpSocket::bind(bind_addr).await?;
        Ok(Prober {
            config,
            socket,
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Runs all configured attempts to completion and returns one outcome per
    ///  attempt. Timeouts are expected outcomes, not errors: the run never
    ///  aborts early, and the result has exactly `config.attempts` entries.
    ///
    /// Acknowledgment handling is deliberately lenient: any datagram arriving
    ///  within the attempt's window counts as [AttemptOutcome::Acknowledged],
    ///  whether or not its payload is the expected `PONG` token. A payload
    ///  mismatch is logged but does not change the outcome.
    pub async fn run(&self) -> anyhow::Result<Vec<Attempt>> {
        let mut attempts = Vec::with_capacity(self.config.attempts);
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];

        for index in 1..=self.config.attempts {
            info!("sending PING {} to {}", index, self.config.target);
            self.socket.send_to(PROBE, self.config.target).await?;

            let outcome = match timeout(self.config.attempt_timeout, self.socket.recv_from(&mut buf)).await {
                Ok(received) => {
                    let (num_read, from) = received?;
                    let payload = buf[..num_read].to_vec();
                    if payload == ACKNOWLEDGMENT {
                        info!("PING {} acknowledged by {}: {}", index, from, String::from_utf8_lossy(&payload));
                    }
                    else {
                        warn!("PING {} acknowledged by {} with unexpected payload {:?}", index, from, payload);
                    }
                    AttemptOutcome::Acknowledged { payload }
                }
                Err(_) => {
                    info!("PING {} timed out", index);
                    AttemptOutcome::TimedOut
                }
            };
            attempts.push(Attempt { index, outcome });
        }
        Ok(attempts)
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use super::*;

    async fn test_config(attempts: usize, attempt_timeout: Duration) -> (ProberConfig, UdpSocket) {
        let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let mut config = ProberConfig::new(peer.local_addr().unwrap());
        config.attempts = attempts;
        config.attempt_timeout = attempt_timeout;
        (config, peer)
    }

    /// peer that answers every incoming datagram with the given payload,
    ///  counting the datagrams it saw
    fn spawn_replying_peer(peer: UdpSocket, response: &'static [u8]) -> Arc<AtomicUsize> {
        let num_received = Arc::new(AtomicUsize::new(0));
        let counter = num_received.clone();
        tokio::spawn(async move {
            let mut buf = [0u8; MAX_DATAGRAM_SIZE];
            loop {
                let (_, from) = peer.recv_from(&mut buf).await.unwrap();
                counter.fetch_add(1, Ordering::AcqRel);
                peer.send_to(response, from).await.unwrap();
            }
        });
        num_received
    }

    #[tokio::test]
    async fn test_all_attempts_acknowledged() {
        let (config, peer) = test_config(3, Duration::from_secs(1)).await;
        let num_received = spawn_replying_peer(peer, ACKNOWLEDGMENT);

        let prober = Prober::bind(config).await.unwrap();
        let attempts = prober.run().await.unwrap();

        assert_eq!(attempts.len(), 3);
        for (i, attempt) in attempts.iter().enumerate() {
            assert_eq!(attempt.index, i + 1);
            assert_eq!(attempt.outcome, AttemptOutcome::Acknowledged { payload: b"PONG".to_vec() });
        }
        assert_eq!(num_received.load(Ordering::Acquire), 3);
    }

    #[tokio::test]
    async fn test_unexpected_payload_still_acknowledged() {
        let (config, peer) = test_config(2, Duration::from_secs(1)).await;
        spawn_replying_peer(peer, b"HELLO");

        let prober = Prober::bind(config).await.unwrap();
        let attempts = prober.run().await.unwrap();

        assert_eq!(attempts.len(), 2);
        for attempt in &attempts {
            assert_eq!(attempt.outcome, AttemptOutcome::Acknowledged { payload: b"HELLO".to_vec() });
        }
    }

    #[tokio::test]
    async fn test_unreachable_target_times_out_every_attempt() {
        // bind a socket to reserve an address nobody answers on, then drop it
        let (config, peer) = test_config(3, Duration::from_millis(50)).await;
        drop(peer);

        let prober = Prober::bind(config).await.unwrap();
        let attempts = prober.run().await.unwrap();

        assert_eq!(attempts.len(), 3);
        for (i, attempt) in attempts.iter().enumerate() {
            assert_eq!(attempt.index, i + 1);
            assert_eq!(attempt.outcome, AttemptOutcome::TimedOut);
        }
    }

    #[tokio::test]
    async fn test_zero_attempts() {
        let (config, _peer) = test_config(0, Duration::from_millis(50)).await;

        let prober = Prober::bind(config).await.unwrap();
        let attempts = prober.run().await.unwrap();
        assert!(attempts.is_empty());
    }
}
