//! RTCM-3 SSR stream decoder and SSR to OSR translator.
#![doc(html_logo_url = "https://raw.githubusercontent.com/rtk-rs/.github/master/logos/logo2.jpg")]
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

/*
 * RTCM-SSR is part of the nav-solutions framework.
 * Authors: Guillaume W. Bres <guillaume.bressaix@gmail.com> et al.
 * (cf. https://github.com/nav-solutions/rtcm-ssr/graphs/contributors)
 * This framework is shipped under Mozilla Public V2 license.
 *
 * Documentation: https://github.com/nav-solutions/rtcm-ssr
 */

use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::Path,
};

use itertools::Itertools;
use log::{debug, warn};

#[cfg(feature = "flate2")]
use flate2::read::GzDecoder;

use gnss_rs::prelude::{Constellation, SV};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod bits;
pub mod constants;
pub mod coords;
pub mod crc;
pub mod ephemeris;
pub mod errors;
pub mod frame;
pub mod iono;
pub mod messages;
pub mod orbit;
pub mod osr;
pub mod ssr;
pub mod time;

#[cfg(test)]
mod tests;

use crate::{
    ephemeris::{EphemerisFrame, EphemerisStore},
    errors::{DecodingError, Error, FormattingError},
    frame::FrameIterator,
    messages::RtcmMessage,
    ssr::SsrStore,
    time::TimeContext,
};

pub(crate) type Vector3D = (f64, f64, f64);

pub mod prelude {
    pub use crate::{
        coords::Receiver,
        ephemeris::{EphemerisFrame, EphemerisRecord, EphemerisStore},
        errors::{DecodingError, Error, FormattingError, OsrError},
        messages::RtcmMessage,
        osr::{OsrEpoch, OsrRow, Ssr2Osr},
        ssr::{CorrectionSet, SsrStore},
        time::TimeContext,
        RtcmSsr, StreamReport,
    };

    // Pub re-export
    pub use gnss_rs::prelude::{Constellation, SV};
}

/// Decoding session statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StreamReport {
    /// Checksum verified frames
    pub frames: usize,

    /// Preamble candidates rejected by checksum
    pub crc_failures: usize,

    /// Possible unknown (non SSR) messages
    pub unknown_messages: usize,

    /// Messages dropped because their schedule did not match
    /// the payload
    pub schedule_mismatches: usize,

    /// Signal entries skipped because their tracking mode does not
    /// resolve through the signal tables
    pub unresolved_tracking_modes: usize,
}

/// [RtcmSsr] is a fully decoded RTCM-SSR session: every decoded
/// message in order of arrival, the accumulated broadcast ephemeris
/// and the accumulated SSR corrections.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RtcmSsr {
    /// Every decoded message, in order of arrival.
    pub messages: Vec<RtcmMessage>,

    /// Accumulated broadcast ephemeris.
    pub ephemeris: EphemerisStore,

    /// Accumulated SSR corrections.
    pub corrections: SsrStore,

    /// Session statistics.
    pub report: StreamReport,
}

impl RtcmSsr {
    /// Decodes and accumulates an entire RTCM-SSR stream from a
    /// local file.
    pub fn from_file(path: impl AsRef<Path>, context: &TimeContext) -> Result<Self, Error> {
        let mut fd = File::open(path)?;
        let mut buffer = Vec::new();
        fd.read_to_end(&mut buffer)?;
        Ok(Self::from_bytes(&buffer, context))
    }

    /// Decodes and accumulates an entire gzip compressed RTCM-SSR
    /// stream from a local file.
    #[cfg(feature = "flate2")]
    #[cfg_attr(docsrs, doc(cfg(feature = "flate2")))]
    pub fn from_gzip_file(path: impl AsRef<Path>, context: &TimeContext) -> Result<Self, Error> {
        let fd = File::open(path)?;
        let mut reader = GzDecoder::new(fd);
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(Self::from_bytes(&buffer, context))
    }

    /// Decodes and accumulates an RTCM-SSR stream from any
    /// [Read]able interface, draining it entirely.
    pub fn from_reader<R: Read>(reader: &mut R, context: &TimeContext) -> Result<Self, Error> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(Self::from_bytes(&buffer, context))
    }

    /// Decodes and accumulates an RTCM-SSR byte stream. The stream
    /// does not need to start on a frame boundary, and corrupted
    /// sections only cost the frames they damage.
    pub fn from_bytes(bytes: &[u8], context: &TimeContext) -> Self {
        let mut session = Self::default();
        let mut iterator = FrameIterator::new(bytes);
        let mut mismatch_logged = false;

        for frame in &mut iterator {
            session.report.frames += 1;

            // a zero length frame is valid but carries no message
            if frame.payload.len() < 2 {
                continue;
            }

            match RtcmMessage::decode(frame.payload, context) {
                Ok(message) => {
                    let unresolved = message.unresolved_tracking_modes();
                    if unresolved > 0 {
                        debug!(
                            "message {}: {} unresolved tracking modes",
                            message.number(),
                            unresolved,
                        );
                        session.report.unresolved_tracking_modes += unresolved;
                    }

                    session.sort_message(message, context);
                }
                Err(DecodingError::UnknownMessageNumber(number)) => {
                    debug!("possible unknown message {}", number);
                    session.report.unknown_messages += 1;
                }
                Err(error) => {
                    if !mismatch_logged {
                        warn!("dropped message: {}", error);
                        mismatch_logged = true;
                    } else {
                        debug!("dropped message: {}", error);
                    }
                    session.report.schedule_mismatches += 1;
                }
            }
        }

        session.report.crc_failures = iterator.crc_failures();
        session
    }

    /// Routes one decoded message to the ephemeris or the SSR store.
    /// Glonass epochs (seconds of day) are re-stamped into GPS time
    /// once a Glonass ephemeris has supplied the day number.
    fn sort_message(&mut self, message: RtcmMessage, context: &TimeContext) {
        let epoch_s = |session: &Self, msg_epoch: u32, constellation: Constellation| -> u32 {
            if constellation != Constellation::Glonass {
                return msg_epoch;
            }

            match session.ephemeris.glonass_day_number(msg_epoch) {
                Some((nt, n4)) => {
                    let n4 = n4.unwrap_or(context.n4);
                    let (_, tow) =
                        time::glonass_to_gps_time(nt, msg_epoch as f64, n4, context.leap_seconds);
                    tow.round() as u32
                }
                None => {
                    // no ephemeris received yet: the Glonass epoch
                    // is kept as is
                    msg_epoch
                }
            }
        };

        match &message {
            RtcmMessage::GpsEphemeris(eph)
            | RtcmMessage::BdsEphemeris(eph)
            | RtcmMessage::QzssEphemeris(eph)
            | RtcmMessage::GalileoFnavEphemeris(eph)
            | RtcmMessage::GalileoInavEphemeris(eph) => {
                self.ephemeris
                    .insert(eph.toe_s, EphemerisFrame::Kepler(eph.clone()));
            }

            RtcmMessage::GlonassEphemeris(eph) => {
                let n4 = eph.n4.unwrap_or(context.n4);
                let (_, tow) = time::glonass_to_gps_time(
                    eph.nt,
                    eph.tb_s as f64,
                    n4,
                    context.leap_seconds,
                );

                self.ephemeris
                    .insert(tow.round() as u32, EphemerisFrame::Glonass(eph.clone()));
            }

            RtcmMessage::Orbit(msg) => {
                let epoch = epoch_s(self, msg.header.epoch_s, msg.constellation);
                self.corrections.insert_orbit(epoch, msg.clone());
            }

            RtcmMessage::Clock(msg) => {
                let epoch = epoch_s(self, msg.header.epoch_s, msg.constellation);
                self.corrections.insert_clock(epoch, msg.clone());
            }

            RtcmMessage::OrbitClock(msg) => {
                let epoch = epoch_s(self, msg.header.epoch_s, msg.constellation);
                self.corrections.insert_orbit_clock(epoch, msg.clone());
            }

            RtcmMessage::CodeBias(msg) => {
                let epoch = epoch_s(self, msg.header.epoch_s, msg.constellation);
                self.corrections.insert_code_bias(epoch, msg.clone());
            }

            RtcmMessage::PhaseBias(msg) => {
                let epoch = epoch_s(self, msg.header.epoch_s, msg.constellation);
                self.corrections.insert_phase_bias(epoch, msg.clone());
            }

            RtcmMessage::Ura(msg) => {
                let epoch = epoch_s(self, msg.header.epoch_s, msg.constellation);
                self.corrections.insert_ura(epoch, msg.clone());
            }

            RtcmMessage::HighRateClock(msg) => {
                let epoch = epoch_s(self, msg.header.epoch_s, msg.constellation);
                self.corrections.insert_high_rate_clock(epoch, msg.clone());
            }

            RtcmMessage::Vtec(msg) => {
                self.corrections.insert_iono(msg.epoch_s, msg.clone());
            }
        }

        self.messages.push(message);
    }

    /// Iterates every decoded message, in order of arrival.
    pub fn messages_iter(&self) -> impl Iterator<Item = &RtcmMessage> + '_ {
        self.messages.iter()
    }

    /// Iterates the SSR correction epochs, in order of arrival.
    pub fn epochs_iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.corrections.epochs_iter()
    }

    /// Iterates the ionosphere epochs, in order of arrival.
    pub fn iono_epochs_iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.corrections.iono_epochs_iter()
    }

    /// Iterates all satellites a broadcast ephemeris was received
    /// for, sorted.
    pub fn satellites_iter(&self) -> impl Iterator<Item = SV> + '_ {
        self.ephemeris.satellites_iter()
    }

    /// Iterates all constellations this session decoded anything
    /// for, sorted.
    pub fn constellations_iter(&self) -> impl Iterator<Item = Constellation> + '_ {
        self.messages
            .iter()
            .filter_map(|message| message.constellation())
            .sorted()
            .dedup()
    }

    /// Dumps every decoded message in a human readable form, in
    /// order of arrival.
    pub fn format_messages<W: Write>(&self, writer: &mut W) -> Result<(), FormattingError> {
        for message in self.messages.iter() {
            writeln!(writer, "{}", message)?;
        }
        Ok(())
    }

    /// Dumps every decoded message into a local file (the `.ssr` sink).
    pub fn to_ssr_file(&self, path: impl AsRef<Path>) -> Result<(), FormattingError> {
        let fd = File::create(path)?;
        let mut writer = BufWriter::new(fd);
        self.format_messages(&mut writer)
    }
}
