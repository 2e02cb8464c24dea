use std::convert::TryFrom;

use bitflags::bitflags;

use crate::proto;

#[rustfmt::skip]
bitflags! {
  pub struct ControllerCapabilities: u32 {
    const CREATE_DELETE_VOLUME         = 0b_0000_0000_0000_0001;
    const LIST_VOLUMES                 = 0b_0000_0000_0000_0100;
  }
}

use proto::controller_service_capability::rpc::Type;
impl TryFrom<ControllerCapabilities> for proto::ControllerGetCapabilitiesResponse {
  type Error = tonic::Status;

  fn try_from(value: ControllerCapabilities) -> Result<Self, Self::Error> {
    #[inline]
    fn push_cap(
      vec: &mut Vec<proto::ControllerServiceCapability>,
      value: ControllerCapabilities,
      test: ControllerCapabilities,
      proto: Type,
    ) {
      if value.contains(test) {
        vec.push(proto::ControllerServiceCapability {
          r#type: Some(proto::controller_service_capability::Type::Rpc(
            proto::controller_service_capability::Rpc {
              r#type: proto as i32,
            },
          )),
        })
      }
    }

    let mut capabilities = Vec::with_capacity(2);
    push_cap(
      &mut capabilities,
      value,
      ControllerCapabilities::CREATE_DELETE_VOLUME,
      Type::CreateDeleteVolume,
    );
    push_cap(
      &mut capabilities,
      value,
      ControllerCapabilities::LIST_VOLUMES,
      Type::ListVolumes,
    );

    Ok(proto::ControllerGetCapabilitiesResponse { capabilities })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use test_case::test_case;

  fn rpc_types(capabilities: ControllerCapabilities) -> Vec<i32> {
    proto::ControllerGetCapabilitiesResponse::try_from(capabilities)
      .expect("capabilities convert")
      .capabilities
      .into_iter()
      .filter_map(|c| match c.r#type {
        Some(proto::controller_service_capability::Type::Rpc(rpc)) => Some(rpc.r#type),
        None => None,
      })
      .collect()
  }

  #[test_case(ControllerCapabilities::empty() => Vec::<i32>::new() ; "none")]
  #[test_case(ControllerCapabilities::CREATE_DELETE_VOLUME => vec![Type::CreateDeleteVolume as i32] ; "create delete")]
  #[test_case(ControllerCapabilities::all() => vec![Type::CreateDeleteVolume as i32, Type::ListVolumes as i32] ; "all")]
  fn reports_capabilities(capabilities: ControllerCapabilities) -> Vec<i32> {
    rpc_types(capabilities)
  }
}
