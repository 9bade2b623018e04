use std::marker::PhantomData;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::ResponderConfig;
use crate::protocol::{ACKNOWLEDGMENT, MAX_DATAGRAM_SIZE, PROBE};
use crate::util::random::Random;


/// Answers liveness probes on a fixed endpoint, dropping a configured
///  fraction of them to simulate packet loss, and terminates itself after an
///  idle period with no incoming datagrams.
///
/// Datagrams are processed strictly one at a time in arrival order; there is
///  no per-client state, and each acknowledgment goes only to the address the
///  probe came from. The randomness behind the drop decision is injected via
///  `R` so tests can supply a deterministic sequence.
pub struct Responder<R: Random> {
    config: ResponderConfig,
    socket: UdpSocket,
    _random: PhantomData<R>,
}

impl <R: Random> Responder<R> {
    pub async fn bind(config: ResponderConfig) -> anyhow::Result<Responder<R>> {
        config.validate()?;
        let socket = UdpSocket::bind(config.listen_addr).await?;
        info!("listening on {}", socket.local_addr()?);
        Ok(Responder {
            config,
            socket,
            _random: PhantomData,
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Runs the receive loop until the idle timeout expires, which is a clean
    ///  shutdown rather than an error. Wrapping each receive in a fresh
    ///  `timeout(idle_timeout, ..)` resets the idle deadline on every
    ///  received datagram without needing a separate timer.
    pub async fn serve(&self) -> anyhow::Result<()> {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        loop {
            let (num_read, from) = match timeout(self.config.idle_timeout, self.socket.recv_from(&mut buf)).await {
                Ok(received) => received?,
                Err(_) => {
                    info!("idle for {:?}, shutting down", self.config.idle_timeout);
                    return Ok(());
                }
            };

            let payload = &buf[..num_read];
            if payload != PROBE {
                debug!("ignoring unexpected payload {:?} from {}", payload, from);
                continue;
            }

            info!("received PING from {}", from);
            if Self::accepts(self.config.drop_probability) {
                self.socket.send_to(ACKNOWLEDGMENT, from).await?;
                info!("sent PONG to {}", from);
            }
            else {
                // simulated packet loss, not an error
                info!("dropped PING from {}", from);
            }
        }
    }

    /// accept iff the uniform draw falls below the accept rate `1 - drop_probability`
    fn accepts(drop_probability: f64) -> bool {
        R::uniform() < 1.0 - drop_probability
    }
}
