#![allow(clippy::all, unreachable_pub)]

tonic::include_proto!("csi.v1");
