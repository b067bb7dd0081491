//! Real-time RTP jitter buffer.
//!
//! Absorbs network reordering and arrival-time variance in a stream of RTP
//! packets, then releases them to a downstream consumer at their scheduled
//! presentation time, at most once each, in strictly ascending sequence
//! order. Packets arriving late enough that they can never be presented in
//! order are dropped rather than reinserted.
//!
//! The crate is organized the way the original jitter buffer is: a
//! wrap-aware sequence comparator ([`seq`]), an ordered packet store
//! ([`store`]), a release-deadline scheduler ([`scheduler`]), and a
//! coordinator ([`coordinator`]) that ties ingress, the store, and a
//! dedicated egress worker thread together behind one lock.
//!
//! ```no_run
//! use std::sync::Arc;
//! use rtp_jbuf::clock::SystemClock;
//! use rtp_jbuf::config::Config;
//! use rtp_jbuf::coordinator::JitterBuffer;
//! use rtp_jbuf::format::StaticFormatTable;
//! # struct MySink;
//! # impl rtp_jbuf::sink::Downstream for MySink {
//! #     fn push(&self, _packet: rtp_jbuf::packet::Packet, _discontinuous: bool) -> rtp_jbuf::sink::FlowResult {
//! #         rtp_jbuf::sink::FlowResult::Ok
//! #     }
//! #     fn push_eos(&self) -> rtp_jbuf::sink::FlowResult { rtp_jbuf::sink::FlowResult::Ok }
//! # }
//!
//! let resolver = Arc::new(StaticFormatTable::new().with_rate(96, 90_000));
//! let sink = Arc::new(MySink);
//! let jb = JitterBuffer::new(Config::default(), sink, resolver).unwrap();
//! jb.start();
//! ```

pub mod clock;
pub mod config;
pub mod control;
pub mod coordinator;
pub mod error;
pub mod ext_ts;
pub mod format;
pub mod packet;
pub mod rtp;
pub mod scheduler;
pub mod segment;
pub mod seq;
pub mod sink;
pub mod store;

pub use config::Config;
pub use coordinator::{JitterBuffer, Latency, SrcResult};
pub use error::{Error, Result};
pub use packet::Packet;
