use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;
use tracing::{info, warn};

use crate::config::Config;
use crate::endpoint;
use crate::redirect::{RedirectPool, UpstreamTarget, handshake};
use crate::tls;

/// Binds the listening socket and runs the accept loop until the process
/// is terminated.
pub async fn run(cfg: &Config) -> Result<()> {
    let listener = Listener::bind(cfg).await?;
    listener.run().await
}

/// The listening socket plus everything dispatch needs: the optional TLS
/// capability and the upstream rotation.
pub struct Listener {
    inner: TcpListener,
    acceptor: Option<TlsAcceptor>,
    pool: RedirectPool,
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("inner", &self.inner)
            .field("acceptor", &self.acceptor.is_some())
            .field("pool", &self.pool)
            .finish()
    }
}

impl Listener {
    /// Resolves the configuration and binds the socket.
    ///
    /// Everything here is fatal: an empty or unparseable upstream list, an
    /// unparseable listen spec, a secure listen endpoint without TLS
    /// material, or a failed bind all abort startup before any connection
    /// is accepted.
    pub async fn bind(cfg: &Config) -> Result<Self> {
        let pool = RedirectPool::from_specs(&cfg.upstreams)?;

        let listen = endpoint::parse(&cfg.listen)
            .with_context(|| format!("failed parsing listen address {:?}", cfg.listen))?;

        let acceptor = if listen.secure {
            let tls_cfg = cfg
                .tls
                .as_ref()
                .context("listen endpoint requires tls but no certificate is configured")?;
            Some(tls::acceptor(tls_cfg)?)
        } else {
            None
        };

        let addr = listen.authority();
        let inner = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed listening on {:?}", addr))?;
        info!(
            "Listening on {} ({})",
            addr,
            if listen.secure { "tls" } else { "plain" }
        );

        Ok(Self {
            inner,
            acceptor,
            pool,
        })
    }

    /// Address the socket actually bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Accept loop.
    ///
    /// The next target is taken on this task, before the handshake is
    /// spawned, so rotation order is fixed at dispatch time no matter how
    /// slowly individual clients complete. Accept errors are transient:
    /// log and keep going.
    pub async fn run(self) -> Result<()> {
        loop {
            let (socket, peer) = match self.inner.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "Failed to accept connection");
                    continue;
                }
            };

            let target = self.pool.next_target().await;
            info!(peer = %peer, target = %target, "Redirecting connection");

            let acceptor = self.acceptor.clone();
            tokio::spawn(async move {
                if let Err(e) = redirect_connection(socket, acceptor, &target).await {
                    tracing::debug!(peer = %peer, error = %e, "Redirect handshake failed");
                }
            });
        }
    }
}

async fn redirect_connection(
    socket: TcpStream,
    acceptor: Option<TlsAcceptor>,
    target: &UpstreamTarget,
) -> Result<()> {
    match acceptor {
        Some(acceptor) => {
            let mut stream = acceptor.accept(socket).await?;
            handshake::run(&mut stream, target).await
        }
        None => {
            let mut socket = socket;
            handshake::run(&mut socket, target).await
        }
    }
}
