//! AT Commands needed to move a SIMCom/Quectel style modem between command
//! and PPP data mode. Following V.25ter and 3GPP TS 27.007.

pub mod control;
pub mod mobile_control;
pub mod psn;

use atat::atat_derive::{AtatCmd, AtatLen, AtatResp};
use serde::{Deserialize, Serialize};

#[derive(Clone, AtatResp)]
pub struct NoResponse;

#[derive(Clone, AtatCmd)]
#[at_cmd("", NoResponse)]
pub struct AT;

/// PDP context identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AtatLen)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ContextId(pub u8);

#[cfg(test)]
mod test {
    use super::*;
    use atat::AtatCmd as _;

    #[test]
    fn serialize_at() {
        let mut buf = [0u8; 8];
        let len = AT.write(&mut buf);
        assert_eq!(&buf[..len], b"AT\r\n");
    }
}
