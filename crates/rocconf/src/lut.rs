//! Built-in HGCROC v2 register map.
//!
//! Every row is `(parameter, segments, default)` with segments given as
//! `(register, min_bit, n_bits)`, least-significant chunk first. The tables are
//! validated once, on first use.
//!
//! Only the register 0 rows of [GLOBAL_ANALOG] and `Tot_vref` in
//! [REFERENCE_VOLTAGE] are checked against a known-good register map. Every other
//! row is provisional: it follows the HGCROC v2 parameter naming but its layout
//! and default have not been confirmed on hardware. These defaults are written
//! to every page unless defaults are disabled, so check them before loading a chip.

use std::sync::{Arc, OnceLock};

use crate::{
    catalogue::ParameterCatalogue,
    errors::SpecError,
    registry::{PageGroup, PageRegistry},
};

type Table = &'static [(&'static str, &'static [(u8, u8, u8)], u64)];

pub const GLOBAL_ANALOG: Table = &[
    ("ON_dac_trim", &[(0, 0, 1)], 1),
    ("ON_input_dac", &[(0, 1, 1)], 1),
    ("ON_conv", &[(0, 2, 1)], 1),
    ("ON_pa", &[(0, 3, 1)], 1),
    ("Gain_conv", &[(0, 4, 4)], 0b0100),
    ("ON_ref_adc", &[(1, 0, 1)], 1),
    ("ON_rtr", &[(1, 1, 1)], 1),
    ("ON_toa", &[(1, 2, 1)], 1),
    ("ON_tot", &[(1, 3, 1)], 1),
    ("ON_discri", &[(1, 4, 1)], 1),
    ("Sw_super_conv", &[(1, 5, 1)], 0),
    ("Cf", &[(2, 0, 4)], 10),
    ("Cf_comp", &[(2, 4, 4)], 10),
    ("Rf", &[(3, 0, 4)], 12),
    ("S_sk", &[(3, 4, 3)], 2),
    ("Delay40", &[(4, 0, 3)], 2),
    ("Delay65", &[(4, 3, 3)], 2),
    ("Delay87", &[(5, 0, 3)], 2),
    ("Delay9", &[(5, 3, 3)], 2),
    ("Ibi_sk", &[(6, 0, 2)], 0),
    ("Ibo_sk", &[(6, 2, 6)], 0),
    ("Ibi_inv", &[(7, 0, 2)], 0),
    ("Ibo_inv", &[(7, 2, 6)], 0),
    ("Ibi_noinv", &[(8, 0, 2)], 0),
    ("Ibo_noinv", &[(8, 2, 6)], 0),
    ("Dacb_vb_conv", &[(9, 0, 8)], 0),
];

pub const REFERENCE_VOLTAGE: Table = &[
    ("Probe_vref_pa", &[(0, 0, 1)], 0),
    ("Probe_vref_time", &[(0, 1, 1)], 0),
    ("Refi", &[(0, 2, 2)], 3),
    ("Vbg_1v", &[(0, 4, 3)], 4),
    ("ON_dac", &[(0, 7, 1)], 1),
    ("Inv_vref", &[(1, 0, 2), (4, 0, 8)], 320),
    ("Noinv_vref", &[(1, 2, 2), (5, 0, 8)], 320),
    ("Toa_vref", &[(1, 4, 2), (3, 0, 8)], 112),
    ("Tot_vref", &[(1, 6, 2), (2, 0, 8)], 432),
    ("Calib_dac", &[(6, 0, 8), (7, 0, 4)], 0),
    ("Choice_cinj", &[(7, 5, 1)], 0),
    ("IntCtest", &[(7, 6, 1)], 0),
    ("ExtCtest", &[(7, 7, 1)], 0),
];

pub const MASTER_TDC: Table = &[
    ("GLOBAL_TA_SELECT_GAIN_TOA", &[(0, 0, 4)], 3),
    ("GLOBAL_TA_SELECT_GAIN_TOT", &[(0, 4, 4)], 3),
    ("GLOBAL_MODE_NO_TOT_SUB", &[(1, 0, 1)], 0),
    ("GLOBAL_LATENCY_TIME", &[(1, 1, 4)], 10),
    ("GLOBAL_MODE_FTDC_TOA_S0", &[(1, 5, 1)], 0),
    ("GLOBAL_MODE_FTDC_TOA_S1", &[(1, 6, 1)], 1),
    ("GLOBAL_SEU_TIME_OUT", &[(1, 7, 1)], 1),
    ("BIAS_FOLLOWER_CAL_P_D", &[(2, 0, 4)], 0),
    ("BIAS_FOLLOWER_CAL_P_EN", &[(2, 4, 1)], 0),
    ("INV_FRONT_40MHZ", &[(2, 5, 1)], 0),
    ("START_COUNTER", &[(2, 6, 1)], 1),
    ("CALIB_CHANNEL_DLL", &[(2, 7, 1)], 0),
    ("VD_CTDC_P_D", &[(3, 0, 5)], 16),
    ("VD_CTDC_P_DAC_EN", &[(3, 5, 1)], 0),
    ("EN_MASTER_CTDC_VOUT_INIT", &[(3, 6, 1)], 0),
    ("EN_MASTER_CTDC_DLL", &[(3, 7, 1)], 1),
    ("BIAS_CAL_DAC_CTDC_P_D", &[(4, 0, 4)], 0),
    ("CTDC_CALIB_FREQUENCY", &[(4, 4, 4), (5, 0, 4)], 2),
    ("GLOBAL_MODE_TOA_DIRECT_OUTPUT", &[(5, 4, 1)], 0),
    ("BIAS_I_CTDC_D", &[(5, 5, 3)], 6),
    ("VD_FTDC_P_D", &[(6, 0, 5)], 16),
    ("VD_FTDC_P_DAC_EN", &[(6, 5, 1)], 0),
    ("EN_MASTER_FTDC_VOUT_INIT", &[(6, 6, 1)], 0),
    ("EN_MASTER_FTDC_DLL", &[(6, 7, 1)], 1),
    ("BIAS_CAL_DAC_FTDC_P_D", &[(7, 0, 4)], 0),
    ("FTDC_CALIB_FREQUENCY", &[(7, 4, 4), (8, 0, 4)], 2),
    ("GLOBAL_EN_BUFFER_CTDC", &[(8, 4, 1)], 0),
    ("GLOBAL_DISABLE_TOT_LIMIT", &[(8, 5, 1)], 0),
    ("GLOBAL_FORCE_EN_CLK", &[(8, 6, 1)], 0),
    ("GLOBAL_FORCE_EN_OUTPUT_DATA", &[(8, 7, 1)], 0),
];

pub const DIGITAL_HALF: Table = &[
    ("L1Offset", &[(0, 0, 8), (1, 0, 1)], 8),
    ("Adc_TH", &[(1, 1, 5)], 0),
    ("Sel_L1_fcmd", &[(1, 6, 1)], 0),
    ("IdleFrame", &[(2, 0, 8), (3, 0, 8), (4, 0, 8), (5, 0, 4)], 0xCCC_CCCC),
    ("SC_testRAM", &[(5, 4, 1)], 0),
    ("ClrAdcTot_trig", &[(5, 5, 1)], 0),
    ("Bx_offset", &[(6, 0, 8), (7, 0, 4)], 2),
    ("Bx_trigger", &[(7, 4, 4), (8, 0, 8)], 64),
    ("MultFactor", &[(9, 0, 5)], 25),
    ("CalibrationSC", &[(9, 5, 1)], 1),
    ("Tot_TH0", &[(10, 0, 8)], 0),
    ("Tot_TH1", &[(11, 0, 8)], 0),
];

pub const TOP: Table = &[
    ("BIAS_I_PLL_D", &[(0, 0, 6)], 63),
    ("EN_LOCK_CONTROL", &[(0, 6, 1)], 1),
    ("DIV_PLL", &[(1, 0, 2)], 1),
    ("EN_HIGH_CAPA", &[(1, 2, 1)], 1),
    ("EN_REF_BG", &[(1, 3, 1)], 1),
    ("EN_PhaseShift", &[(1, 4, 1)], 0),
    ("Phase", &[(2, 0, 4)], 0),
    ("RunL", &[(3, 0, 1)], 0),
    ("RunR", &[(3, 1, 1)], 0),
    ("TestMode", &[(3, 2, 1)], 0),
    ("Sel_PLL_Locked", &[(3, 3, 1)], 0),
];

/// Shared by channel, common-mode and calibration pages.
pub const CHANNEL_WISE: Table = &[
    ("Inputdac", &[(0, 0, 6)], 31),
    ("Dacb", &[(1, 0, 6)], 0),
    ("Sign_dac", &[(1, 6, 1)], 0),
    ("Ref_dac_tot", &[(2, 0, 5)], 0),
    ("Mask_toa", &[(2, 5, 1)], 0),
    ("Ref_dac_toa", &[(3, 0, 5)], 0),
    ("Mask_tot", &[(3, 5, 1)], 0),
    ("Trim_inv", &[(4, 0, 6)], 0),
    ("DAC_CAL_CTDC_TOA", &[(5, 0, 5)], 0),
    ("DAC_CAL_FTDC_TOA", &[(6, 0, 6)], 0),
    ("DAC_CAL_CTDC_TOT", &[(7, 0, 5)], 0),
    ("DAC_CAL_FTDC_TOT", &[(8, 0, 6)], 0),
    ("Adc_pedestal", &[(9, 0, 8)], 0),
    ("Lowrange", &[(10, 0, 1)], 0),
    ("Highrange", &[(10, 1, 1)], 0),
    ("Channel_off", &[(10, 2, 1)], 0),
    ("Probe_inv", &[(10, 3, 1)], 0),
    ("Probe_pa", &[(10, 4, 1)], 0),
    ("Probe_toa", &[(10, 5, 1)], 0),
    ("Probe_tot", &[(10, 6, 1)], 0),
    ("Probe_noinv", &[(10, 7, 1)], 0),
    ("Mask_adc", &[(11, 0, 1)], 0),
    ("Mask_AlignBuffer", &[(11, 1, 1)], 0),
    ("sel_trigger_toa", &[(11, 2, 1)], 1),
    ("sel_trigger_tot", &[(11, 3, 1)], 1),
];

/// Channels per chip half.
const HALF_CHANNELS: u16 = 36;

/// First page id of the half-0 block; half 1 starts at 0.
const HALF_0_BASE: u16 = 256;

fn pages(entries: &[(&str, u16)]) -> Vec<(String, u16)> {
    entries
        .iter()
        .map(|&(name, id)| (name.to_string(), id))
        .collect()
}

fn channel_pages() -> Vec<(String, u16)> {
    (0..2 * HALF_CHANNELS)
        .map(|channel| {
            let id = if channel < HALF_CHANNELS {
                HALF_0_BASE + channel
            } else {
                channel - HALF_CHANNELS
            };
            (format!("Channel_{channel}"), id)
        })
        .collect()
}

/// Builds the HGCROC v2 registry from the tables above.
pub fn build_hgcroc() -> Result<PageRegistry, SpecError> {
    let channel_wise = Arc::new(ParameterCatalogue::from_table("channel_wise", CHANNEL_WISE)?);
    let table = |name: &str, rows: Table| ParameterCatalogue::from_table(name, rows).map(Arc::new);

    PageRegistry::new(vec![
        PageGroup::new(
            "Channel",
            r"Channel_\d+",
            Arc::clone(&channel_wise),
            channel_pages(),
        ),
        PageGroup::new(
            "CM",
            r"CM_\d",
            Arc::clone(&channel_wise),
            pages(&[("CM_0", 292), ("CM_1", 293), ("CM_2", 36), ("CM_3", 37)]),
        ),
        PageGroup::new(
            "CALIB",
            r"CALIB_\d",
            channel_wise,
            pages(&[("CALIB_0", 294), ("CALIB_1", 38)]),
        ),
        PageGroup::new(
            "Reference_Voltage",
            r"Reference_Voltage_\d",
            table("reference_voltage", REFERENCE_VOLTAGE)?,
            pages(&[("Reference_Voltage_0", 296), ("Reference_Voltage_1", 40)]),
        ),
        PageGroup::new(
            "Global_Analog",
            r"Global_Analog_\d",
            table("global_analog", GLOBAL_ANALOG)?,
            pages(&[("Global_Analog_0", 297), ("Global_Analog_1", 41)]),
        ),
        PageGroup::new(
            "Master_TDC",
            r"Master_TDC_\d",
            table("master_tdc", MASTER_TDC)?,
            pages(&[("Master_TDC_0", 298), ("Master_TDC_1", 42)]),
        ),
        PageGroup::new(
            "Digital_Half",
            r"Digital_Half_\d",
            table("digital_half", DIGITAL_HALF)?,
            pages(&[("Digital_Half_0", 299), ("Digital_Half_1", 43)]),
        ),
        PageGroup::new("Top", "Top", table("top", TOP)?, pages(&[("Top", 44)])),
    ])
}

static HGCROC: OnceLock<Result<PageRegistry, SpecError>> = OnceLock::new();

/// The process-wide HGCROC v2 registry, built and validated on first call.
pub fn hgcroc() -> Result<&'static PageRegistry, SpecError> {
    HGCROC
        .get_or_init(build_hgcroc)
        .as_ref()
        .map_err(Clone::clone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_is_valid() {
        let registry = hgcroc().unwrap();
        assert_eq!(registry.len(), 72 + 4 + 2 + 2 + 2 + 2 + 2 + 1);
        assert_eq!(registry.groups().len(), 8);
    }

    #[test]
    fn test_page_ids() {
        let registry = hgcroc().unwrap();
        let id = |name: &str| registry.get(name).unwrap().id();

        assert_eq!(id("Global_Analog_0"), 297);
        assert_eq!(id("Global_Analog_1"), 41);
        assert_eq!(id("Reference_Voltage_0"), 296);
        assert_eq!(id("Reference_Voltage_1"), 40);
        assert_eq!(id("Channel_0"), 256);
        assert_eq!(id("Channel_35"), 291);
        assert_eq!(id("Channel_36"), 0);
        assert_eq!(id("Channel_71"), 35);
        assert_eq!(id("Top"), 44);
    }

    #[test]
    fn test_channel_like_pages_share_catalogue() {
        let registry = hgcroc().unwrap();
        let channel = registry.get("Channel_17").unwrap().catalogue();
        assert_eq!(channel.name(), "channel_wise");
        assert_eq!(registry.get("CM_2").unwrap().catalogue().name(), "channel_wise");
        assert_eq!(registry.get("CALIB_0").unwrap().catalogue().name(), "channel_wise");
    }

    #[test]
    fn test_documented_layouts() {
        let registry = hgcroc().unwrap();

        let on_pa = registry
            .get("Global_Analog_0")
            .unwrap()
            .catalogue()
            .get("ON_pa")
            .unwrap();
        assert_eq!(on_pa.default, 1);
        assert_eq!(on_pa.field.segments()[0].register, 0);
        assert_eq!(on_pa.field.segments()[0].min_bit, 3);
        assert_eq!(on_pa.field.total_bits(), 1);

        let tot_vref = registry
            .get("Reference_Voltage_1")
            .unwrap()
            .catalogue()
            .get("Tot_vref")
            .unwrap();
        assert_eq!(tot_vref.default, 432);
        assert_eq!(tot_vref.field.total_bits(), 10);
    }

    #[test]
    fn test_hgcroc_is_built_once() {
        assert!(std::ptr::eq(hgcroc().unwrap(), hgcroc().unwrap()));
    }
}
