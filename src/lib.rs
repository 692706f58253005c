//! VoiceCore - voice memo recorder
//!
//! Records audio from the microphone, tags it with a content template and
//! uploads it to a processing backend, tracking each attempt through a small
//! recording session state machine.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Session state machine, format negotiation, templates, value objects and errors
//! - **Application**: Port interfaces (traits) and the recording session controller
//! - **Infrastructure**: Adapter implementations (cpal capture, HTTP upload, TOML config)
//! - **CLI**: Argument parsing, interactive and timed runners, output and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
