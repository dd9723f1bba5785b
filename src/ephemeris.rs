//! Broadcast ephemeris accumulation and nearest-epoch lookup.

use std::collections::HashMap;

use gnss_rs::prelude::{Constellation, SV};
use itertools::Itertools;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::messages::ephemeris::{GlonassEphemeris, KeplerEphemeris};

/// A broadcast ephemeris of any constellation: Keplerian elements,
/// or a PZ-90 state vector for Glonass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EphemerisFrame {
    /// GPS, Galileo, BDS or QZSS orbital elements
    Kepler(KeplerEphemeris),

    /// Glonass state vector
    Glonass(GlonassEphemeris),
}

impl EphemerisFrame {
    /// Satellite this frame applies to.
    pub fn sv(&self) -> SV {
        match self {
            Self::Kepler(eph) => eph.sv,
            Self::Glonass(eph) => eph.sv,
        }
    }

    /// Issue of data, when the constellation defines one.
    pub fn iode(&self) -> Option<u16> {
        match self {
            Self::Kepler(eph) => Some(eph.iode),
            Self::Glonass(_) => None,
        }
    }
}

/// One accumulated ephemeris, stamped with a GPS comparable
/// reference time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EphemerisRecord {
    /// Reference time: toe for Keplerian frames, tb (converted to
    /// GPS time of week) for Glonass frames.
    pub tow_s: u32,

    /// Decoded [EphemerisFrame]
    pub frame: EphemerisFrame,
}

/// [EphemerisStore] organises broadcast ephemeris per satellite, in
/// order of arrival. Records are never mutated once inserted.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EphemerisStore {
    records: HashMap<SV, Vec<EphemerisRecord>>,
}

impl EphemerisStore {
    /// Inserts a new record. Idempotent on duplicate reference time:
    /// re-broadcast frames do not grow the store.
    pub fn insert(&mut self, tow_s: u32, frame: EphemerisFrame) {
        let records = self.records.entry(frame.sv()).or_default();

        if records.iter().any(|rec| rec.tow_s == tow_s) {
            return;
        }

        records.push(EphemerisRecord { tow_s, frame });
    }

    /// True when no ephemeris was accumulated at all.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total number of accumulated records.
    pub fn len(&self) -> usize {
        self.records.values().map(|records| records.len()).sum()
    }

    /// Iterates all satellites with at least one record, sorted.
    pub fn satellites_iter(&self) -> impl Iterator<Item = SV> + '_ {
        self.records.keys().copied().sorted()
    }

    /// Iterates all constellations with at least one record, sorted.
    pub fn constellations_iter(&self) -> impl Iterator<Item = Constellation> + '_ {
        self.satellites_iter()
            .map(|sv| sv.constellation)
            .unique()
    }

    /// Returns the record of requested satellite whose reference time
    /// is nearest to `tow_s` (minimum absolute difference), None when
    /// that satellite was never described.
    pub fn nearest(&self, sv: SV, tow_s: u32) -> Option<&EphemerisRecord> {
        self.records
            .get(&sv)?
            .iter()
            .min_by_key(|rec| (rec.tow_s as i64 - tow_s as i64).abs())
    }

    /// Returns the day number (nt) of the Glonass ephemeris whose tb
    /// is nearest to provided Glonass second of day. Used to re-stamp
    /// Glonass SSR epochs into GPS time.
    pub(crate) fn glonass_day_number(&self, glo_sod: u32) -> Option<(u16, Option<u8>)> {
        self.records
            .iter()
            .filter(|(sv, _)| sv.constellation == Constellation::Glonass)
            .flat_map(|(_, records)| records.iter())
            .filter_map(|rec| match &rec.frame {
                EphemerisFrame::Glonass(eph) => Some(eph),
                _ => None,
            })
            .min_by_key(|eph| (eph.tb_s as i64 - glo_sod as i64).abs())
            .map(|eph| (eph.nt, eph.n4))
    }
}

#[cfg(test)]
mod test {
    use super::{EphemerisFrame, EphemerisStore};
    use crate::messages::ephemeris::KeplerEphemeris;
    use gnss_rs::prelude::{Constellation, SV};

    fn fake_kepler(sv: SV, toe_s: u32) -> EphemerisFrame {
        EphemerisFrame::Kepler(KeplerEphemeris {
            sv,
            week: 2088,
            iode: 10,
            iodc: None,
            toe_s,
            toc_s: toe_s,
            sqrt_a: 5153.0,
            ecc: 0.01,
            m0_rad: 0.0,
            dn_rad_s: 0.0,
            i0_rad: 0.95,
            idot_rad_s: 0.0,
            omega0_rad: 0.0,
            omega_dot_rad_s: 0.0,
            omega_rad: 0.0,
            crs_m: 0.0,
            crc_m: 0.0,
            cus_rad: 0.0,
            cuc_rad: 0.0,
            cis_rad: 0.0,
            cic_rad: 0.0,
            af0_s: 0.0,
            af1_s_s: 0.0,
            af2_s_s2: 0.0,
            tgd_s: 0.0,
            tgd2_s: None,
            ura_index: 0,
            health: 0,
            code_on_l2: None,
            l2p_data: None,
            fit_interval: None,
        })
    }

    #[test]
    fn nearest_lookup() {
        let g01 = SV::new(Constellation::GPS, 1);
        let g02 = SV::new(Constellation::GPS, 2);

        let mut store = EphemerisStore::default();
        store.insert(7_200, fake_kepler(g01, 7_200));
        store.insert(14_400, fake_kepler(g01, 14_400));

        assert_eq!(store.nearest(g01, 8_000).unwrap().tow_s, 7_200);
        assert_eq!(store.nearest(g01, 12_000).unwrap().tow_s, 14_400);
        assert!(store.nearest(g02, 8_000).is_none());
    }

    #[test]
    fn idempotent_insertion() {
        let g01 = SV::new(Constellation::GPS, 1);

        let mut store = EphemerisStore::default();
        store.insert(7_200, fake_kepler(g01, 7_200));
        store.insert(7_200, fake_kepler(g01, 7_200));

        assert_eq!(store.len(), 1);
        assert_eq!(store.satellites_iter().collect::<Vec<_>>(), vec![g01]);
    }
}
