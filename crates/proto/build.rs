use std::{env, io, path::PathBuf};

fn main() -> io::Result<()> {
  let root = env::var_os("CARGO_MANIFEST_DIR")
    .map(PathBuf::from)
    .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "CARGO_MANIFEST_DIR is not set"))?;
  let proto_dir = root.join("proto");
  let csi_proto_file = proto_dir.join("csi.proto");

  println!("cargo:rerun-if-changed={}", csi_proto_file.display());

  tonic_build::configure()
    .build_client(false)
    .build_server(true)
    .compile(&[csi_proto_file], &[proto_dir])
}
