// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire protocol boundary.
//!
//! The bus never touches sockets or the binary packet layout. A
//! [`Transport`] implementation does, and hands every inbound packet over as
//! an [`InboundPacket`]: an [`OpCode`] plus decoded [`PacketFields`].
//!
//! # Operation codes
//!
//! | Code | Name | Handling |
//! |---|---|---|
//! | `0x2000` | `OpPoll` | ignored (our own discovery request) |
//! | `0x2100` | `OpPollReply` | forwarded to the node health monitor |
//! | `0x2400` | `OpCommand` | logged |
//! | `0x5000` | `OpDmx` | logged with the owning fixture |
//! | `0x9900` | `OpTrigger` | decoded by the named sensor and fired as an event |

mod op_code;
mod packet;
mod poll_reply;
mod router;
mod transport;

pub use op_code::OpCode;
pub use packet::{Field, InboundPacket, PacketFields, field};
pub use poll_reply::PollReply;
pub(crate) use router::PacketRouter;
pub use transport::{PacketHandler, Transport};

#[cfg(test)]
pub(crate) use transport::testing;
