use anyhow::Context;
use clap::Parser;
use maya_client::MayaClient;
use openebs_csi::{Config, OpenEbsPlugin, Provisioner};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::parse();
  info!(
    driver = %config.driver_name,
    node_id = %config.node_id,
    namespace = %config.namespace,
    "starting OpenEBS CSI plugin"
  );

  let provisioner = Provisioner::new(Arc::new(MayaClient::new()), config.resolver())
    .with_lookup_policy(config.lookup_policy())
    .with_delete_policy(config.delete_policy());
  let plugin = Arc::new(OpenEbsPlugin::new(
    config.driver_name.clone(),
    config.node_id.clone(),
    provisioner,
  ));

  csi_proto::serve(plugin, &config.endpoint, shutdown_signal())
    .await
    .with_context(|| format!("failed to serve CSI on {:?}", config.endpoint))?;

  info!("shut down");
  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      error!(error = %e, "failed to listen for ctrl-c");
      futures::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut signal) => {
        signal.recv().await;
      }
      Err(e) => {
        error!(error = %e, "failed to listen for SIGTERM");
        futures::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = futures::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => info!("received ctrl-c"),
    _ = terminate => info!("received SIGTERM"),
  }
}
