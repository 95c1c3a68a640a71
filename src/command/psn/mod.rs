//! ### Packet Switched Data Services Commands

use super::{ContextId, NoResponse};
use atat::atat_derive::AtatCmd;

/// PDP context definition +CGDCONT
///
/// Defines the connection parameters for a PDP context, identified by the
/// local context identification parameter <cid>. The APN is what the
/// network uses to select the packet data gateway.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGDCONT", NoResponse)]
pub struct SetPDPContextDefinition<'a> {
    #[at_arg(position = 0)]
    pub cid: ContextId,
    #[at_arg(position = 1, len = 6)]
    pub pdp_type: &'a str,
    #[at_arg(position = 2, len = 99)]
    pub apn: &'a str,
}

/// Enter PPP state D*99***
///
/// Causes the MT to perform whatever actions are necessary to establish
/// communication between the DTE and the external PDN, using the PDP context
/// <cid>. On success the MT answers `CONNECT` and switches to data mode, after
/// which the DTE starts PPP negotiation on the same line.
#[derive(Clone, AtatCmd)]
#[at_cmd(
    "D*99***",
    NoResponse,
    value_sep = false,
    timeout_ms = 180000,
    abortable = true,
    termination = "#\r\n"
)]
pub struct EnterPPP {
    #[at_arg(position = 0)]
    pub cid: ContextId,
}

/// Hang up H
///
/// Terminates a data call from online command mode, i.e. after the escape
/// sequence. Alternatively, in data transfer mode, DTR toggling or PPP
/// disconnection may be used.
#[derive(Clone, AtatCmd)]
#[at_cmd("H", NoResponse)]
pub struct DeactivatePDPContext;

#[cfg(test)]
mod test {
    use super::*;
    use atat::AtatCmd as _;

    #[test]
    fn serialize_pdp_context_definition() {
        let mut buf = [0u8; 64];
        let len = SetPDPContextDefinition {
            cid: ContextId(1),
            pdp_type: "IP",
            apn: "iot.1nce.net",
        }
        .write(&mut buf);
        assert_eq!(&buf[..len], b"AT+CGDCONT=1,\"IP\",\"iot.1nce.net\"\r\n");
    }

    #[test]
    fn serialize_enter_ppp() {
        let mut buf = [0u8; 32];
        let len = EnterPPP { cid: ContextId(1) }.write(&mut buf);
        assert_eq!(&buf[..len], b"ATD*99***1#\r\n");
    }
}
