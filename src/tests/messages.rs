//! Message catalog dedicated tests: synthetic payloads are built
//! field by field and decoded back.

use crate::{
    errors::DecodingError,
    messages::{two_pow, RtcmMessage},
    prelude::*,
    tests::BitWriter,
};

fn context() -> TimeContext {
    // day 100 of 2018: GPS week 1996, first rollover era
    TimeContext::from_year_doy(2018, 100)
}

/// Message 1019 with everything zeroed but the fields of interest.
fn message_1019(prn: u8, week_raw: u32) -> Vec<u8> {
    let mut w = BitWriter::new(1019);

    w.unsigned(prn as u64, 6);
    w.unsigned(week_raw as u64, 10);
    w.unsigned(2, 4); // ura
    w.unsigned(1, 2); // code on L2
    w.signed(-50, 14); // idot
    w.unsigned(75, 8); // iode
    w.unsigned(225, 16); // toc: 3600 s
    w.signed(0, 8); // af2
    w.signed(-10, 16); // af1
    w.signed(214_748, 22); // af0
    w.unsigned(75, 10); // iodc
    w.signed(160, 16); // crs: 5.0 m
    w.signed(100, 16); // dn
    w.signed(1 << 29, 32); // m0: pi/4
    w.signed(0, 16); // cuc
    w.unsigned(1 << 30, 32); // e: 0.125
    w.signed(0, 16); // cus
    w.unsigned(2_702_000_128, 32); // sqrt(A)
    w.unsigned(225, 16); // toe: 3600 s
    w.signed(0, 16); // cic
    w.signed(0, 32); // omega0
    w.signed(0, 16); // cis
    w.signed(1 << 30, 32); // i0: pi/2
    w.signed(96, 16); // crc: 3.0 m
    w.signed(0, 32); // omega
    w.signed(-1000, 24); // omega dot
    w.signed(-10, 8); // tgd
    w.unsigned(0, 6); // health
    w.unsigned(1, 1); // l2p
    w.unsigned(0, 1); // fit
    w.payload()
}

#[test]
fn gps_ephemeris_1019() {
    let payload = message_1019(1, 1023);
    let message = RtcmMessage::decode(&payload, &context()).unwrap();

    assert_eq!(message.number(), 1019);
    assert_eq!(message.constellation(), Some(Constellation::GPS));
    assert!(message.is_ephemeris());

    let eph = match message {
        RtcmMessage::GpsEphemeris(eph) => eph,
        _ => panic!("wrong variant"),
    };

    assert_eq!(eph.sv.to_string(), "G01");
    assert_eq!(eph.week, 2047, "broadcast week must resolve to +1024");
    assert_eq!(eph.iode, 75);
    assert_eq!(eph.iodc, Some(75));
    assert_eq!(eph.toe_s, 3600);
    assert_eq!(eph.toc_s, 3600);
    assert_eq!(eph.crs_m, 5.0);
    assert_eq!(eph.crc_m, 3.0);
    assert_eq!(eph.ecc, 0.125);
    assert_eq!(eph.m0_rad, std::f64::consts::FRAC_PI_4);
    assert_eq!(eph.i0_rad, std::f64::consts::FRAC_PI_2);
    assert_eq!(eph.sqrt_a, 2_702_000_128.0 * two_pow(-19));
    assert_eq!(eph.af0_s, 214_748.0 * two_pow(-31));
    assert_eq!(eph.af1_s_s, -10.0 * two_pow(-43));
    assert_eq!(eph.tgd_s, -10.0 * two_pow(-31));
    assert_eq!(eph.code_on_l2, Some(1));
    assert_eq!(eph.l2p_data, Some(true));
    assert_eq!(eph.fit_interval, Some(false));
}

#[test]
fn qzss_ephemeris_1044() {
    let mut w = BitWriter::new(1044);

    w.unsigned(1, 4); // satellite index
    w.unsigned(450, 16); // toc
    w.signed(0, 8);
    w.signed(0, 16);
    w.signed(0, 22);
    w.unsigned(17, 8); // iode
    w.signed(0, 16);
    w.signed(0, 16);
    w.signed(0, 32);
    w.signed(0, 16);
    w.unsigned(0, 32);
    w.signed(0, 16);
    w.unsigned(2_702_000_128, 32);
    w.unsigned(450, 16); // toe: 7200 s
    w.signed(0, 16);
    w.signed(0, 32);
    w.signed(0, 16);
    w.signed(0, 32);
    w.signed(0, 16);
    w.signed(0, 32);
    w.signed(0, 24);
    w.signed(0, 14);
    w.unsigned(0, 2);
    w.unsigned(60, 10); // week
    w.unsigned(0, 4);
    w.unsigned(0, 6);
    w.signed(0, 8);
    w.unsigned(17, 10);
    w.unsigned(0, 1);

    let message = RtcmMessage::decode(&w.payload(), &context()).unwrap();

    let eph = match message {
        RtcmMessage::QzssEphemeris(eph) => eph,
        _ => panic!("wrong variant"),
    };

    assert_eq!(eph.sv.to_string(), "J193", "satellite index offsets by 192");
    assert_eq!(eph.toe_s, 7200);
    assert_eq!(eph.week, 2108, "raw 60 resolves nearest to week 1996");
}

#[test]
fn glonass_ephemeris_1020() {
    let mut w = BitWriter::new(1020);

    w.unsigned(5, 6); // satellite
    w.unsigned(8, 5); // channel: +1 after the -7 offset
    w.unsigned(0, 1);
    w.unsigned(0, 1);
    w.unsigned(0, 2);
    w.unsigned(10, 5); // tk hours
    w.unsigned(30, 6); // tk minutes
    w.unsigned(1, 1); // tk 30 s
    w.unsigned(0, 1); // Bn
    w.unsigned(0, 1); // P2
    w.unsigned(12, 7); // tb: 10800 s

    // x axis: velocity, position, acceleration
    w.sign_magnitude(-4096, 24);
    w.sign_magnitude(38_912_000, 27); // 19000 km
    w.sign_magnitude(3, 5);

    // y axis
    w.sign_magnitude(2048, 24);
    w.sign_magnitude(-20_480_000, 27); // -10000 km
    w.sign_magnitude(0, 5);

    // z axis
    w.sign_magnitude(0, 24);
    w.sign_magnitude(28_672_000, 27); // 14000 km
    w.sign_magnitude(-1, 5);

    w.unsigned(0, 1); // P3
    w.sign_magnitude(-100, 11); // gamma
    w.unsigned(0, 2); // P
    w.unsigned(0, 1); // ln
    w.sign_magnitude(2000, 22); // tau
    w.sign_magnitude(0, 5); // delta tau
    w.unsigned(0, 5); // En
    w.unsigned(0, 1); // P4
    w.unsigned(2, 4); // Ft
    w.unsigned(1476, 11); // Nt
    w.unsigned(1, 2); // M
    w.unsigned(1, 1); // additional data
    w.unsigned(1477, 11); // NA
    w.sign_magnitude(500, 32); // tau c
    w.unsigned(6, 5); // N4
    w.sign_magnitude(0, 22); // tau GPS
    w.unsigned(0, 1); // ln
    w.unsigned(0, 7); // reserved

    let message = RtcmMessage::decode(&w.payload(), &context()).unwrap();

    let eph = match message {
        RtcmMessage::GlonassEphemeris(eph) => eph,
        _ => panic!("wrong variant"),
    };

    assert_eq!(eph.sv.to_string(), "R05");
    assert_eq!(eph.channel, 1);
    assert_eq!(eph.tk_s, 10 * 3600 + 30 * 60 + 30);
    assert_eq!(eph.tb_s, 10_800);
    assert_eq!(eph.position_km.0, 19_000.0);
    assert_eq!(eph.position_km.1, -10_000.0);
    assert_eq!(eph.position_km.2, 14_000.0);
    assert_eq!(eph.velocity_km_s.0, -4096.0 * two_pow(-20));
    assert_eq!(eph.acceleration_km_s2.2, -1.0 * two_pow(-30));
    assert_eq!(eph.gamma, -100.0 * two_pow(-40));
    assert_eq!(eph.tau_s, 2000.0 * two_pow(-30));
    assert_eq!(eph.nt, 1476);
    assert_eq!(eph.n4, Some(6));
    assert_eq!(eph.na, Some(1477));
    assert!(eph.tau_c_s.is_some());
}

/// Message 1060 of spec interest: two satellites, combined
/// orbit & clock.
pub(crate) fn message_1060(epoch_s: u32, c0_raw: i64) -> Vec<u8> {
    let mut w = BitWriter::new(1060);

    w.unsigned(epoch_s as u64, 20);
    w.unsigned(2, 4); // update interval: 5 s
    w.unsigned(0, 1); // multiple message
    w.unsigned(0, 1); // datum
    w.unsigned(1, 4); // iod ssr
    w.unsigned(258, 16); // provider
    w.unsigned(0, 4); // solution
    w.unsigned(2, 6); // satellites

    for sat in [5_u64, 13] {
        w.unsigned(sat, 6);
        w.unsigned(75, 8); // iode
        w.signed(100, 22); // radial: +0.0100 m
        w.signed(-25, 20); // along: -0.0100 m
        w.signed(50, 20); // cross: +0.0200 m
        w.signed(0, 21);
        w.signed(0, 19);
        w.signed(0, 19);
        w.signed(c0_raw, 22); // C0
        w.signed(0, 21); // C1
        w.signed(0, 27); // C2
    }

    w.payload()
}

#[test]
fn gps_orbit_clock_1060() {
    let payload = message_1060(252_000, 1000);
    let message = RtcmMessage::decode(&payload, &context()).unwrap();

    assert_eq!(message.number(), 1060);

    let msg = match message {
        RtcmMessage::OrbitClock(msg) => msg,
        _ => panic!("wrong variant"),
    };

    assert_eq!(msg.constellation, Constellation::GPS);
    assert_eq!(msg.header.epoch_s, 252_000);
    assert_eq!(msg.header.update_interval_s, 5);
    assert_eq!(msg.header.iod_ssr, 1);
    assert_eq!(msg.header.provider_id, 258);
    assert_eq!(msg.header.satellites, 2);
    assert_eq!(msg.corrections.len(), 2);

    let g05 = SV::new(Constellation::GPS, 5);
    let g13 = SV::new(Constellation::GPS, 13);

    let correction = msg.correction(g05).unwrap();
    assert_eq!(correction.orbit.iode, 75);
    assert!((correction.orbit.radial_m - 0.0100).abs() < 1.0E-12);
    assert!((correction.orbit.along_m - -0.0100).abs() < 1.0E-12);
    assert!((correction.orbit.cross_m - 0.0200).abs() < 1.0E-12);
    assert!((correction.clock.c0_m - 0.1).abs() < 1.0E-12);

    assert!(msg.correction(g13).is_some());
    assert!(msg.correction(SV::new(Constellation::GPS, 1)).is_none());
}

/// GPS code biases for G07: signals 1C and 1X, plus the unassigned
/// tracking mode 13.
pub(crate) fn message_1059(epoch_s: u32) -> Vec<u8> {
    let mut w = BitWriter::new(1059);

    w.unsigned(epoch_s as u64, 20);
    w.unsigned(0, 4);
    w.unsigned(0, 1);
    w.unsigned(1, 4);
    w.unsigned(258, 16);
    w.unsigned(0, 4);
    w.unsigned(1, 6); // one satellite

    w.unsigned(7, 6); // G07
    w.unsigned(3, 5); // three biases
    w.unsigned(0, 5); // 1C
    w.signed(50, 14); // 0.50 m
    w.unsigned(20, 5); // 1X
    w.signed(-121, 14); // -1.21 m
    w.unsigned(13, 5); // unassigned index
    w.signed(1, 14);

    w.payload()
}

#[test]
fn gps_code_bias_1059() {
    let message = RtcmMessage::decode(&message_1059(252_000), &context()).unwrap();

    let msg = match message {
        RtcmMessage::CodeBias(msg) => msg,
        _ => panic!("wrong variant"),
    };

    let g07 = SV::new(Constellation::GPS, 7);

    assert!((msg.bias_m(g07, "1C").unwrap() - 0.5).abs() < 1.0E-12);
    assert!((msg.bias_m(g07, "1X").unwrap() - -1.21).abs() < 1.0E-12);

    // the unresolved tracking mode is counted and retained in the
    // record, but never resolves to a signal
    assert_eq!(msg.unresolved_tracking_modes(), 1);
    assert_eq!(msg.corrections[0].biases.len(), 3);
    assert_eq!(msg.bias_m(g07, "5I"), None);
}

#[test]
fn gps_phase_bias_1265() {
    let mut w = BitWriter::new(1265);

    w.unsigned(252_000, 20);
    w.unsigned(0, 4);
    w.unsigned(0, 1);
    w.unsigned(1, 4);
    w.unsigned(258, 16);
    w.unsigned(0, 4);
    w.unsigned(1, 1); // dispersive bias consistency
    w.unsigned(0, 1); // MW consistency
    w.unsigned(1, 6); // one satellite

    w.unsigned(9, 6); // G09
    w.unsigned(1, 5); // one bias
    w.unsigned(256, 9); // yaw: 180 deg
    w.signed(-64, 8); // yaw rate
    w.unsigned(0, 5); // 1C
    w.unsigned(1, 1); // integer
    w.unsigned(2, 2); // wide lane indicator
    w.unsigned(5, 4); // discontinuity
    w.signed(42, 20); // 0.0042 m

    let message = RtcmMessage::decode(&w.payload(), &context()).unwrap();

    let msg = match message {
        RtcmMessage::PhaseBias(msg) => msg,
        _ => panic!("wrong variant"),
    };

    assert!(msg.dispersive_bias_consistency);
    assert!(!msg.mw_consistency);

    let g09 = SV::new(Constellation::GPS, 9);
    let correction = msg.correction(g09).unwrap();

    assert_eq!(correction.yaw_deg, 180.0);
    assert_eq!(correction.yaw_rate_deg_s, -64.0 * 180.0 * two_pow(-13));

    assert!((msg.bias_m(g09, "1C").unwrap() - 0.0042).abs() < 1.0E-12);

    let bias = &correction.biases[0];
    assert!(bias.integer);
    assert_eq!(bias.wide_lane_integer, 2);
    assert_eq!(bias.discontinuity, 5);
}

#[test]
fn phase_bias_yaw_quantization() {
    // decoded angle is y (180/256) degrees over the entire range
    for raw in [0_u64, 1, 100, 255, 256, 511] {
        let mut w = BitWriter::new(1265);

        w.unsigned(0, 20);
        w.unsigned(0, 4);
        w.unsigned(0, 1);
        w.unsigned(0, 4);
        w.unsigned(0, 16);
        w.unsigned(0, 4);
        w.unsigned(0, 1);
        w.unsigned(0, 1);
        w.unsigned(1, 6);

        w.unsigned(1, 6);
        w.unsigned(0, 5); // no biases
        w.unsigned(raw, 9);
        w.signed(0, 8);

        let message = RtcmMessage::decode(&w.payload(), &context()).unwrap();

        let msg = match message {
            RtcmMessage::PhaseBias(msg) => msg,
            _ => panic!("wrong variant"),
        };

        assert_eq!(msg.corrections[0].yaw_deg, raw as f64 * 180.0 / 256.0);
    }
}

#[test]
fn gps_ura_1061() {
    let mut w = BitWriter::new(1061);

    w.unsigned(252_000, 20);
    w.unsigned(0, 4);
    w.unsigned(0, 1);
    w.unsigned(1, 4);
    w.unsigned(258, 16);
    w.unsigned(0, 4);
    w.unsigned(1, 6);

    w.unsigned(3, 6); // G03
    w.unsigned(3, 3); // class
    w.unsigned(2, 3); // value

    let message = RtcmMessage::decode(&w.payload(), &context()).unwrap();

    let msg = match message {
        RtcmMessage::Ura(msg) => msg,
        _ => panic!("wrong variant"),
    };

    // (3^3 (1 + 2/4) - 1) / 1000
    let correction = &msg.corrections[0];
    assert!((correction.ura_m() - 0.0395).abs() < 1.0E-12);
}

/// VTEC message of spec interest: single layer at 450 km,
/// degree 1, order 1, C00 10 TECU.
pub(crate) fn message_1264(epoch_s: u32) -> Vec<u8> {
    let mut w = BitWriter::new(1264);

    w.unsigned(epoch_s as u64, 20);
    w.unsigned(0, 4);
    w.unsigned(0, 1);
    w.unsigned(1, 4);
    w.unsigned(258, 16);
    w.unsigned(0, 4);
    w.unsigned(0, 9); // quality
    w.unsigned(0, 2); // one layer

    w.unsigned(45, 8); // 450 km
    w.unsigned(0, 4); // degree 1
    w.unsigned(0, 4); // order 1

    // cosine: C(0,0), C(1,0), C(1,1)
    w.signed(2000, 16); // 10 TECU
    w.signed(0, 16);
    w.signed(0, 16);

    // sine: S(1,1)
    w.signed(0, 16);

    w.payload()
}

#[test]
fn vtec_1264() {
    let message = RtcmMessage::decode(&message_1264(252_000), &context()).unwrap();

    assert_eq!(message.number(), 1264);
    assert_eq!(message.constellation(), None, "VTEC applies globally");

    let msg = match message {
        RtcmMessage::Vtec(msg) => msg,
        _ => panic!("wrong variant"),
    };

    assert_eq!(msg.epoch_s, 252_000);
    assert_eq!(msg.layers.len(), 1);

    let layer = &msg.layers[0];
    assert_eq!(layer.height_km, 450.0);
    assert_eq!(layer.degree, 1);
    assert_eq!(layer.order, 1);
    assert_eq!(layer.cosine_tecu[0][0], 10.0);
    assert_eq!(layer.cosine_tecu[1][0], 0.0);
    assert_eq!(layer.cosine_tecu[1][1], 0.0);
    assert_eq!(layer.sine_tecu[1][1], 0.0);
}

/// Single layer VTEC message with only C(0,0) set to `raw`.
fn vtec_single_coefficient(raw: i64) -> Vec<u8> {
    let mut w = BitWriter::new(1264);

    w.unsigned(0, 20);
    w.unsigned(0, 4);
    w.unsigned(0, 1);
    w.unsigned(0, 4);
    w.unsigned(0, 16);
    w.unsigned(0, 4);
    w.unsigned(0, 9);
    w.unsigned(0, 2);

    w.unsigned(45, 8);
    w.unsigned(0, 4);
    w.unsigned(0, 4);

    w.signed(raw, 16);
    w.signed(0, 16);
    w.signed(0, 16);
    w.signed(0, 16);

    w.payload()
}

#[test]
fn vtec_coefficient_round_trip() {
    // decoded coefficients re-quantize to the same bit pattern,
    // out of range values (±163.84, ±163.835) included
    for raw in [-32_768_i64, -32_767, -2000, -1, 0, 1, 2000, 32_767] {
        let message = RtcmMessage::decode(&vtec_single_coefficient(raw), &context()).unwrap();

        let msg = match message {
            RtcmMessage::Vtec(msg) => msg,
            _ => panic!("wrong variant"),
        };

        let decoded = msg.layers[0].cosine_tecu[0][0];
        assert_eq!((decoded / 0.005).round() as i64, raw);
    }
}

#[test]
fn vtec_out_of_range_sentinel() {
    // the extreme wire values denote out of range and are preserved
    for (raw, out_of_range) in [
        (-32_768_i64, true),
        (-32_767, true),
        (32_767, true),
        (-2000, false),
        (0, false),
        (2000, false),
    ] {
        let message = RtcmMessage::decode(&vtec_single_coefficient(raw), &context()).unwrap();

        let msg = match message {
            RtcmMessage::Vtec(msg) => msg,
            _ => panic!("wrong variant"),
        };

        let layer = &msg.layers[0];
        assert_eq!(
            layer.has_out_of_range_coefficients(),
            out_of_range,
            "raw {} sentinel detection",
            raw,
        );

        // preserved as received either way
        assert_eq!((layer.cosine_tecu[0][0] / 0.005).round() as i64, raw);
    }
}

#[test]
fn unknown_message_number() {
    let mut w = BitWriter::new(1005);
    w.unsigned(0, 20);

    assert_eq!(
        RtcmMessage::decode(&w.payload(), &context()),
        Err(DecodingError::UnknownMessageNumber(1005)),
    );
}

#[test]
fn schedule_payload_mismatch() {
    // truncated 1060: the schedule requests more bits than provided
    let payload = message_1060(252_000, 1000);
    let truncated = &payload[..payload.len() - 8];

    assert_eq!(
        RtcmMessage::decode(truncated, &context()),
        Err(DecodingError::PayloadOverrun),
    );

    // trailing garbage: the schedule leaves more than padding behind
    let mut padded = payload.clone();
    padded.extend_from_slice(&[0x00, 0x00]);

    assert_eq!(
        RtcmMessage::decode(&padded, &context()),
        Err(DecodingError::PayloadUnderrun(1060)),
    );
}

#[test]
fn message_dumps() {
    // every synthetic message renders a labelled dump
    for payload in [
        message_1019(1, 1023),
        message_1060(252_000, 1000),
        message_1264(252_000),
    ] {
        let message = RtcmMessage::decode(&payload, &context()).unwrap();
        let dump = message.to_string();

        assert!(dump.starts_with("#*** RTCM 3 message"));
        assert!(dump.len() > 64);
    }
}
