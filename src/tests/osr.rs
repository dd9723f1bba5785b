//! SSR to OSR translation over a complete synthetic session.

use crate::{
    constants::{GPS_L1_FREQUENCY_HZ, IONO_RANGE_FACTOR},
    prelude::*,
    tests::{
        frame_up, init_logger,
        messages::{message_1060, message_1264},
        BitWriter,
    },
};

fn context() -> TimeContext {
    // 2020-01-15: GPS week 2088
    TimeContext::from_year_doy(2020, 15)
}

/// GPS ephemeris describing a circular equatorial orbit with
/// toe = toc = 0: at tow 0, the satellite stands over the
/// (0°, 0°) meridian.
fn circular_1019(prn: u8) -> Vec<u8> {
    let mut w = BitWriter::new(1019);

    w.unsigned(prn as u64, 6);
    w.unsigned(40, 10); // week: resolves to 2088
    w.unsigned(0, 4);
    w.unsigned(0, 2);
    w.signed(0, 14); // idot
    w.unsigned(75, 8); // iode
    w.unsigned(0, 16); // toc
    w.signed(0, 8);
    w.signed(0, 16);
    w.signed(0, 22); // af0
    w.unsigned(75, 10);
    w.signed(0, 16); // crs
    w.signed(0, 16); // dn
    w.signed(0, 32); // m0
    w.signed(0, 16);
    w.unsigned(0, 32); // e: circular
    w.signed(0, 16);
    w.unsigned(2_702_000_128, 32); // sqrt(A): a ~ 26560 km
    w.unsigned(0, 16); // toe
    w.signed(0, 16);
    w.signed(0, 32); // omega0
    w.signed(0, 16);
    w.signed(0, 32); // i0: equatorial
    w.signed(0, 16); // crc
    w.signed(0, 32); // omega
    w.signed(0, 24);
    w.signed(0, 8);
    w.unsigned(0, 6);
    w.unsigned(0, 1);
    w.unsigned(0, 1);

    w.payload()
}

fn phase_bias_1265(prn: u8) -> Vec<u8> {
    let mut w = BitWriter::new(1265);

    w.unsigned(0, 20); // epoch
    w.unsigned(0, 4);
    w.unsigned(0, 1);
    w.unsigned(1, 4);
    w.unsigned(258, 16);
    w.unsigned(0, 4);
    w.unsigned(0, 1);
    w.unsigned(0, 1);
    w.unsigned(1, 6);

    w.unsigned(prn as u64, 6);
    w.unsigned(1, 5);
    w.unsigned(64, 9); // yaw: 45 deg
    w.signed(0, 8);
    w.unsigned(0, 5); // 1C
    w.unsigned(1, 1);
    w.unsigned(0, 2);
    w.unsigned(0, 4);
    w.signed(42, 20); // 0.0042 m

    w.payload()
}

/// Ephemeris for G05, corrections at epoch 0 for G05 and G13
/// (the latter without any ephemeris), one VTEC layer.
fn stream() -> Vec<u8> {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&frame_up(&circular_1019(5)));
    buffer.extend_from_slice(&frame_up(&message_1060(0, 1000)));
    buffer.extend_from_slice(&frame_up(&message_1264(0)));
    buffer.extend_from_slice(&frame_up(&phase_bias_1265(5)));
    buffer
}

#[test]
fn zenith_satellite_translation() {
    init_logger();

    let context = context();
    let session = RtcmSsr::from_bytes(&stream(), &context);

    assert_eq!(session.ephemeris.len(), 1);

    // receiver at the sub satellite point
    let receiver = Receiver::from_ellipsoidal_deg_m(0.0, 0.0, 0.0);

    let translator = Ssr2Osr::new(&session, &receiver, &context);
    let epochs = translator.compute();

    assert_eq!(epochs.len(), 1);
    let epoch = &epochs[0];

    // G13 has corrections but no ephemeris
    let g13 = SV::new(Constellation::GPS, 13);
    assert!(epoch
        .skipped
        .iter()
        .any(|(sv, error)| *sv == g13 && *error == OsrError::MissingEphemeris(g13)));

    assert_eq!(epoch.rows.len(), 1);
    let row = &epoch.rows[0];

    assert_eq!(row.sv.to_string(), "G05");
    assert_eq!(row.week, 2088);
    assert_eq!(row.tow_s, 0);

    // straight overhead
    assert!(row.elevation_deg > 89.9 && row.elevation_deg <= 90.0);

    // clock cell is the C0 polynomial constant (dt = 0)
    assert!((row.clock_m.unwrap() - 0.1).abs() < 1.0E-12);

    // line of sight is radial: the projection keeps the radial
    // component only
    assert!((row.orbit_m.unwrap() - 0.0100).abs() < 1.0E-5);

    // 10 TECU straight up on L1
    let expected_iono =
        IONO_RANGE_FACTOR / (GPS_L1_FREQUENCY_HZ * GPS_L1_FREQUENCY_HZ) * 10.0;
    assert!((row.iono_m.unwrap() - expected_iono).abs() < 1.0E-6);
    assert!((row.iono_m.unwrap() - 1.6237).abs() < 1.0E-3);

    // shapiro delay is a centimeter level positive path delay
    let shapiro = row.shapiro_m.unwrap();
    assert!(shapiro > 1.0E-3 && shapiro < 0.1);

    assert!((row.phase_bias_m.unwrap() - 0.0042).abs() < 1.0E-12);

    // no code bias was broadcast
    assert_eq!(row.code_bias_m, None);

    // one ionosphere diagnostics block, VTEC evaluates to the
    // zonal coefficient
    assert_eq!(epoch.iono.len(), 1);
    let evaluation = &epoch.iono[0];
    assert!((evaluation.layers[0].vtec_tecu - 10.0).abs() < 1.0E-9);
    assert!((evaluation.layers[0].slant_factor - 1.0).abs() < 1.0E-6);
}

#[test]
fn elevation_is_never_negative() {
    let context = context();
    let session = RtcmSsr::from_bytes(&stream(), &context);

    // antipodal receiver: the satellite is below the horizon
    // and must be skipped entirely
    let receiver = Receiver::from_ellipsoidal_deg_m(0.0, 180.0, 0.0);

    let translator = Ssr2Osr::new(&session, &receiver, &context);
    let epochs = translator.compute();

    let g05 = SV::new(Constellation::GPS, 5);
    assert!(epochs[0].rows.is_empty());
    assert!(epochs[0]
        .skipped
        .iter()
        .any(|(sv, error)| *sv == g05 && *error == OsrError::BelowHorizon(g05)));

    for epoch in epochs.iter() {
        for row in epoch.rows.iter() {
            assert!(row.elevation_deg >= 0.0);
        }
    }
}

#[test]
fn slanted_geometry() {
    let context = context();
    let session = RtcmSsr::from_bytes(&stream(), &context);

    // 30 degrees west of the sub satellite point
    let receiver = Receiver::from_ellipsoidal_deg_m(0.0, -30.0, 0.0);

    let translator = Ssr2Osr::new(&session, &receiver, &context);
    let epochs = translator.compute();

    let row = &epochs[0].rows[0];

    assert!(row.elevation_deg > 0.0 && row.elevation_deg < 90.0);

    // wind-up is defined away from the zenith singularity and
    // bounded by half a carrier wavelength
    let windup = row.windup_m.unwrap();
    assert!(windup.is_finite());
    assert!(windup.abs() <= 0.1);

    // slant factor grows away from the zenith
    let evaluation = &epochs[0].iono[0];
    assert!(evaluation.layers[0].slant_factor > 1.0);
    assert!(row.iono_m.unwrap() > 1.6237);
}

#[test]
fn formatted_outputs() {
    let context = context();
    let session = RtcmSsr::from_bytes(&stream(), &context);
    let receiver = Receiver::from_ellipsoidal_deg_m(0.0, 0.0, 0.0);

    let translator = Ssr2Osr::new(&session, &receiver, &context);

    let mut osr = Vec::<u8>::new();
    let mut ion = Vec::<u8>::new();
    translator.format(&mut osr, &mut ion).unwrap();

    let osr = String::from_utf8(osr).unwrap();
    let ion = String::from_utf8(ion).unwrap();

    assert!(osr.contains("#*** Epoch 0"));
    assert!(osr.contains("G05"));
    assert!(osr.contains("0.1000"), "clock cell must read 0.1000");
    assert!(osr.contains("n/a"), "missing code bias must render n/a");
    assert!(osr.contains("# note: G13: no ephemeris received"));

    assert!(ion.contains("### SV pos/vel for SV G05"));
    assert!(ion.contains("Pnm : P(0,0)= 1.0000;"));
    assert!(ion.contains("Sum VTEC=10.000"));

    // the .ssr dump lists every message in order of arrival
    let mut ssr = Vec::<u8>::new();
    session.format_messages(&mut ssr).unwrap();
    let ssr = String::from_utf8(ssr).unwrap();

    assert!(ssr.contains("#*** RTCM 3 message 1019 (GPS ephemeris) ***"));
    assert!(ssr.contains("#*** RTCM 3 message 1060 (SSR orbit & clock corrections) ***"));
    assert!(ssr.contains("#*** RTCM 3 message 1264 (SSR VTEC ionosphere) ***"));
}
