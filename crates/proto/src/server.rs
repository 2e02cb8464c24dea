use crate::{
  controller::Controller, identity::Identity, node::Node, proto, ControllerService, NodeService,
};
use futures::{
  future::{self, Either},
  pin_mut, TryStreamExt,
};
use std::{
  future::Future,
  io,
  net::SocketAddr,
  path::{Path, PathBuf},
  pin::Pin,
  str::FromStr,
  sync::Arc,
  task::{Context, Poll},
};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_stream::wrappers::UnixListenerStream;
use tonic::transport::{server::Connected, Server};
use tracing::{info, warn};

/// Where the gRPC server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
  Unix(PathBuf),
  Tcp(SocketAddr),
}

impl FromStr for Endpoint {
  type Err = ServeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || ServeError::InvalidEndpoint(s.to_owned());

    if let Some(path) = s
      .strip_prefix("unix://")
      .or_else(|| s.strip_prefix("unix:"))
    {
      if path.is_empty() {
        return Err(invalid());
      }

      return Ok(Endpoint::Unix(PathBuf::from(path)));
    }

    if let Some(addr) = s.strip_prefix("tcp://") {
      return addr.parse().map(Endpoint::Tcp).map_err(|_| invalid());
    }

    if s.starts_with('/') {
      return Ok(Endpoint::Unix(PathBuf::from(s)));
    }

    Err(invalid())
  }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ServeError {
  #[error("invalid endpoint '{0}', expected unix://<path> or tcp://<host>:<port>")]
  InvalidEndpoint(String),

  #[error("failed to prepare socket: {0}")]
  Io(#[from] io::Error),

  #[error(transparent)]
  Transport(#[from] tonic::transport::Error),
}

/// Serves the Identity, Controller and Node services of `plugin` on
/// `endpoint` until `shutdown` resolves.
pub async fn serve<T, F>(plugin: Arc<T>, endpoint: &Endpoint, shutdown: F) -> Result<(), ServeError>
where
  T: ControllerService + NodeService,
  F: Future<Output = ()> + Send,
{
  let router = Server::builder()
    .add_service(proto::identity_server::IdentityServer::new(Identity(
      plugin.clone(),
    )))
    .add_service(proto::controller_server::ControllerServer::new(Controller(
      plugin.clone(),
    )))
    .add_service(proto::node_server::NodeServer::new(Node(plugin)));

  match endpoint {
    Endpoint::Tcp(addr) => {
      info!(%addr, "listening for CSI requests");
      router.serve_with_shutdown(*addr, shutdown).await?;
    }

    Endpoint::Unix(path) => {
      prepare_socket(path).await?;
      let listener = tokio::net::UnixListener::bind(path)?;
      info!(path = %path.display(), "listening for CSI requests");

      let incoming = UnixListenerStream::new(listener).map_ok(UnixStream);
      let server = router.serve_with_incoming(incoming);
      pin_mut!(server);
      pin_mut!(shutdown);

      let result = match future::select(server, shutdown).await {
        Either::Left((result, _)) => result.map_err(ServeError::from),
        Either::Right(((), _)) => Ok(()),
      };

      if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), error = %e, "failed to remove socket");
      }

      result?;
    }
  }

  info!("CSI server stopped");
  Ok(())
}

/// Creates the socket directory and removes a socket left over by a
/// previous run.
async fn prepare_socket(path: &Path) -> io::Result<()> {
  if let Some(parent) = path.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }

  match tokio::fs::remove_file(path).await {
    Ok(()) => {
      info!(path = %path.display(), "removed stale socket");
      Ok(())
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
    Err(e) => Err(e),
  }
}

#[derive(Debug)]
struct UnixStream(tokio::net::UnixStream);

impl Connected for UnixStream {}

impl AsyncRead for UnixStream {
  fn poll_read(
    mut self: Pin<&mut Self>,
    cx: &mut Context<'_>,
    buf: &mut ReadBuf<'_>,
  ) -> Poll<io::Result<()>> {
    Pin::new(&mut self.0).poll_read(cx, buf)
  }
}

impl AsyncWrite for UnixStream {
  fn poll_write(
    mut self: Pin<&mut Self>,
    cx: &mut Context<'_>,
    buf: &[u8],
  ) -> Poll<io::Result<usize>> {
    Pin::new(&mut self.0).poll_write(cx, buf)
  }

  fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
    Pin::new(&mut self.0).poll_flush(cx)
  }

  fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
    Pin::new(&mut self.0).poll_shutdown(cx)
  }
}
