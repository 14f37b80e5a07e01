//! Register model — the cached view of the board's state.
//!
//! Every property is an `Option`: `None` means unknown (never received,
//! or its section marker was missing from the last frame).  Properties
//! are grouped by the frame section they are decoded from.
//!
//! The model only changes in two ways:
//! 1. [`RegisterModel::commit`] with a structurally valid frame, which is
//!    decoded into a copy and swapped in whole.
//! 2. An optimistic update after a write acknowledgement
//!    (see [`crate::app::service`]).

mod decode;
pub mod values;

use serde::Serialize;

use crate::protocol::frame::RawFrame;
use values::{ElementMode, HeatPumpMode, Tenths};

/// Number of pumps the board addresses.
pub const PUMP_COUNT: usize = 5;

// ---------------------------------------------------------------------------
// Section groups
// ---------------------------------------------------------------------------

/// Mains supply, temperatures, run-time counters and relays (`R2`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PowerStatus {
    pub mains_current: Option<i32>,
    pub mains_voltage: Option<i32>,
    pub case_temperature: Option<i32>,
    pub port_current: Option<i32>,
    pub heater_temperature: Option<Tenths>,
    pub pool_temperature: Option<Tenths>,
    pub water_present: Option<bool>,
    pub awake_minutes_remaining: Option<i32>,
    pub filter_pump_run_time_total: Option<i32>,
    pub filter_pump_required_mins: Option<i32>,
    pub load_timeout: Option<i32>,
    pub hour_meter: Option<i32>,
    /// Relays 1–9.
    pub relays: [Option<bool>; 9],
}

/// Controller identity, load limits and hardware options (`R3`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ControllerInfo {
    pub current_limit: Option<i32>,
    pub phases: Option<i32>,
    pub load_limits: [Option<i32>; 3],
    pub software_version: Option<String>,
    pub model: Option<String>,
    pub serial_no_1: Option<String>,
    pub serial_no_2: Option<String>,
    /// DIP switches 1–6.
    pub dip_switches: [Option<bool>; 6],
    pub pump_config: Option<String>,
    pub load_shed: Option<i32>,
    pub heater_voltage: Option<i32>,
    pub snooze_remaining: Option<i32>,
    pub status: Option<String>,
    pub prime_count: Option<i32>,
    pub error_code: Option<i32>,
    pub heater_ambient: Option<i32>,
    pub heater_condensor: Option<i32>,
}

/// Operating mode, timers, hysteresis and energy counters (`R4`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Operation {
    pub mode: Option<String>,
    pub service_timers: [Option<i32>; 3],
    pub heat_mode: Option<i32>,
    pub pump_idle_timer: Option<i32>,
    pub pump_run_timer: Option<i32>,
    pub pool_hysteresis: Option<i32>,
    pub heater_hysteresis: Option<i32>,
    pub power: Option<i32>,
    pub power_kwh: Option<i32>,
    pub power_today: Option<i32>,
    pub power_yesterday: Option<i32>,
    pub thermal_cut_out: Option<i32>,
    pub test_switches: [Option<bool>; 3],
    pub element_heat_source_offset: Option<i32>,
    pub frequency: Option<i32>,
    pub hp_heat_source_offset_heat: Option<i32>,
    pub hp_heat_source_offset_cool: Option<i32>,
    pub heat_source_off_time: Option<i32>,
    pub vari_mode: Option<i32>,
    pub vari_speed: Option<i32>,
    pub vari_percent: Option<i32>,
}

/// Touch-pad indicators and water temperature (`R5`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TouchPad {
    pub sleeping: Option<bool>,
    pub ozone: Option<bool>,
    pub heater: Option<bool>,
    pub auto: Option<bool>,
    pub water_temperature: Option<Tenths>,
    pub clean_cycle: Option<bool>,
}

/// User settings: lights, filtration, set-point, power save, sleep (`R6`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Settings {
    pub vari_value: Option<i32>,
    pub light_brightness: Option<i32>,
    pub light_colour: Option<i32>,
    pub light_colour_mode: Option<i32>,
    pub light_speed: Option<i32>,
    pub filter_hours: Option<i32>,
    pub filter_block_hours: Option<i32>,
    pub set_temperature: Option<Tenths>,
    pub clock_24_hours: Option<i32>,
    pub power_save_level: Option<i32>,
    pub power_save_begin: Option<i32>,
    pub power_save_end: Option<i32>,
    pub sleep_1_days: Option<i32>,
    pub sleep_2_days: Option<i32>,
    pub sleep_1_begin: Option<i32>,
    pub sleep_2_begin: Option<i32>,
    pub sleep_1_end: Option<i32>,
    pub sleep_2_end: Option<i32>,
    pub default_screen: Option<i32>,
    pub touch_timeout: Option<i32>,
    pub variable_pump: Option<bool>,
    pub hifi: Option<bool>,
    pub brand: Option<i32>,
    pub prime: Option<i32>,
    pub element: Option<i32>,
    pub spa_type: Option<i32>,
    pub gas: Option<i32>,
}

/// Installer options, calibration and heat-source selection (`R7`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Options {
    pub clean_time: Option<i32>,
    pub ozone_off: Option<bool>,
    pub temperature_units: Option<i32>,
    pub ozone_24: Option<bool>,
    pub cjet: Option<bool>,
    pub circ_24: Option<bool>,
    pub element_mode: Option<ElementMode>,
    pub voltage_max: Option<i32>,
    pub voltage_min: Option<i32>,
    pub voltage_max_24: Option<i32>,
    pub voltage_min_24: Option<i32>,
    pub current_zero: Option<i32>,
    pub current_adjust: Option<i32>,
    pub voltage_adjust: Option<i32>,
    pub service_intervals: [Option<i32>; 3],
    pub vmax: Option<i32>,
    pub auto_hysteresis: Option<i32>,
    pub heat_pump_in_use: Option<bool>,
    pub element_boost: Option<i32>,
    pub heat_pump_mode: Option<HeatPumpMode>,
    pub pump_power_min: Option<i32>,
    pub pump_power_filter: Option<i32>,
    pub pump_power_heater: Option<i32>,
    pub pump_power_max: Option<i32>,
}

/// One entry of the board's fault log (`R9`, `RA`, `RB`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FaultEntry {
    pub hour_meter: Option<i32>,
    pub time: Option<String>,
    pub error: Option<i32>,
    pub current: Option<i32>,
    pub voltage: Option<i32>,
    pub pool_temperature: Option<i32>,
    pub heater_temperature: Option<i32>,
    pub case_temperature: Option<i32>,
    pub pump: Option<i32>,
    pub element: Option<i32>,
    pub status: Option<i32>,
}

/// Heat-pump telemetry and defrost settings (`RE`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeatPump {
    pub present: Option<bool>,
    pub ambient: Option<i32>,
    pub condensor: Option<i32>,
    pub compressor_on: Option<bool>,
    pub fan_on: Option<bool>,
    pub four_way_valve: Option<bool>,
    pub heater_on: Option<bool>,
    pub state: Option<i32>,
    pub mode: Option<i32>,
    pub defrost_timer: Option<i32>,
    pub compressor_run_timer: Option<i32>,
    pub low_temp_timer: Option<i32>,
    pub heat_accum_timer: Option<i32>,
    pub sequence_timer: Option<i32>,
    pub warning: Option<i32>,
    pub freeze_timer: Option<i32>,
    pub defrost_begin: Option<i32>,
    pub defrost_end: Option<i32>,
    pub defrost_compressor: Option<i32>,
    pub defrost_max: Option<i32>,
    pub defrost_element: Option<i32>,
    pub defrost_pump: Option<i32>,
}

/// Per-pump state gathered from `R5` (mode) and `RG` (install/ok-to-run).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PumpStatus {
    pub mode: Option<i32>,
    pub ok_to_run: Option<bool>,
    pub install_state: Option<String>,
}

// ---------------------------------------------------------------------------
// Registers
// ---------------------------------------------------------------------------

/// Every decoded property of the board.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Registers {
    pub power: PowerStatus,
    pub controller: ControllerInfo,
    pub operation: Operation,
    pub touch_pad: TouchPad,
    pub settings: Settings,
    pub options: Options,
    /// Fault log, most recent first.
    pub faults: [FaultEntry; 3],
    pub blower_outlet: Option<i32>,
    pub heat_pump: HeatPump,
    pub pumps: [PumpStatus; PUMP_COUNT],
    pub lock_mode: Option<i32>,
}

/// Cached registers plus the validity of the last full read.
#[derive(Debug, Clone, Default)]
pub struct RegisterModel {
    registers: Registers,
    validated: bool,
}

impl RegisterModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Whether the most recent full read passed every structural check.
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Decode an accepted frame into a copy of the registers and swap it
    /// in whole.
    pub fn commit(&mut self, frame: &RawFrame) {
        let mut next = self.registers.clone();
        next.decode(frame);
        self.registers = next;
        self.validated = true;
    }

    /// A full read failed; the cached registers stay as they were.
    pub fn invalidate(&mut self) {
        self.validated = false;
    }

    /// Direct access for optimistic updates after an acknowledged write.
    pub(crate) fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    /// JSON snapshot of the registers; unknown properties are `null`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.registers)
    }
}
