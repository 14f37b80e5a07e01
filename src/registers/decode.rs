//! Frame → register mapping.
//!
//! Each property is `(marker, offset, type rule)`.  Two failure tiers:
//! - marker missing or offset past the end: the property becomes unknown;
//! - text that does not parse as the declared type: the cached value is
//!   kept and the frame is still good.

use log::debug;

use super::values::{
    ElementMode, HeatPumpMode, parse_flag, parse_int, parse_tenths, parse_text,
};
use super::{FaultEntry, Registers};
use crate::protocol::frame::RawFrame;
use crate::protocol::markers::SectionMarker::{self, R2, R3, R4, R5, R6, R7, R9, RA, RB, RC, RE, RG};

/// Offset-addressed view over one accepted frame.
struct FieldReader<'a> {
    frame: &'a RawFrame,
}

impl FieldReader<'_> {
    fn read<V>(
        &self,
        marker: SectionMarker,
        offset: usize,
        name: &str,
        slot: &mut Option<V>,
        parse: impl Fn(&str) -> Option<V>,
    ) {
        let Some(text) = self.frame.field(marker, offset) else {
            *slot = None;
            return;
        };
        match parse(text) {
            Some(v) => *slot = Some(v),
            None => debug!("{}: kept previous value, got {:?}", name, text),
        }
    }
}

impl Registers {
    /// Apply every property found in `frame`.  Total: never fails.
    pub(super) fn decode(&mut self, frame: &RawFrame) {
        let r = FieldReader { frame };
        self.decode_power(&r);
        self.decode_controller(&r);
        self.decode_operation(&r);
        self.decode_touch_pad(&r);
        self.decode_settings(&r);
        self.decode_options(&r);
        for (entry, marker) in self.faults.iter_mut().zip([R9, RA, RB]) {
            decode_fault(&r, marker, entry);
        }
        r.read(RC, 10, "Outlet_Blower", &mut self.blower_outlet, parse_int);
        self.decode_heat_pump(&r);
        self.decode_pumps(&r);
    }

    fn decode_power(&mut self, r: &FieldReader<'_>) {
        let p = &mut self.power;
        r.read(R2, 1, "MainsCurrent", &mut p.mains_current, parse_int);
        r.read(R2, 2, "MainsVoltage", &mut p.mains_voltage, parse_int);
        r.read(R2, 3, "CaseTemperature", &mut p.case_temperature, parse_int);
        r.read(R2, 4, "PortCurrent", &mut p.port_current, parse_int);
        // R2+6..R2+11 hold the board clock; not decoded.
        r.read(R2, 12, "HeaterTemperature", &mut p.heater_temperature, parse_tenths);
        r.read(R2, 13, "PoolTemperature", &mut p.pool_temperature, parse_tenths);
        r.read(R2, 14, "WaterPresent", &mut p.water_present, parse_flag);
        r.read(R2, 16, "AwakeMinutesRemaining", &mut p.awake_minutes_remaining, parse_int);
        r.read(R2, 17, "FiltPumpRunTimeTotal", &mut p.filter_pump_run_time_total, parse_int);
        r.read(R2, 18, "FiltPumpReqMins", &mut p.filter_pump_required_mins, parse_int);
        r.read(R2, 19, "LoadTimeOut", &mut p.load_timeout, parse_int);
        r.read(R2, 20, "HourMeter", &mut p.hour_meter, parse_int);
        for (i, relay) in p.relays.iter_mut().enumerate() {
            r.read(R2, 21 + i, "Relay", relay, parse_flag);
        }
    }

    fn decode_controller(&mut self, r: &FieldReader<'_>) {
        let c = &mut self.controller;
        r.read(R3, 1, "CLMT", &mut c.current_limit, parse_int);
        r.read(R3, 2, "PHSE", &mut c.phases, parse_int);
        for (i, limit) in c.load_limits.iter_mut().enumerate() {
            r.read(R3, 3 + i, "LLM", limit, parse_int);
        }
        r.read(R3, 6, "SVER", &mut c.software_version, parse_text);
        r.read(R3, 7, "Model", &mut c.model, parse_text);
        r.read(R3, 8, "SerialNo1", &mut c.serial_no_1, parse_text);
        r.read(R3, 9, "SerialNo2", &mut c.serial_no_2, parse_text);
        for (i, dip) in c.dip_switches.iter_mut().enumerate() {
            r.read(R3, 10 + i, "D", dip, parse_flag);
        }
        r.read(R3, 16, "Pump", &mut c.pump_config, parse_text);
        r.read(R3, 17, "LS", &mut c.load_shed, parse_int);
        r.read(R3, 18, "HV", &mut c.heater_voltage, parse_int);
        r.read(R3, 19, "SnpMR", &mut c.snooze_remaining, parse_int);
        r.read(R3, 20, "Status", &mut c.status, parse_text);
        r.read(R3, 21, "PrimeCount", &mut c.prime_count, parse_int);
        r.read(R3, 22, "EC", &mut c.error_code, parse_int);
        r.read(R3, 23, "HAMB", &mut c.heater_ambient, parse_int);
        r.read(R3, 24, "HCON", &mut c.heater_condensor, parse_int);
    }

    fn decode_operation(&mut self, r: &FieldReader<'_>) {
        let o = &mut self.operation;
        r.read(R4, 1, "Mode", &mut o.mode, parse_text);
        for (i, timer) in o.service_timers.iter_mut().enumerate() {
            r.read(R4, 2 + i, "Ser_Timer", timer, parse_int);
        }
        r.read(R4, 5, "HeatMode", &mut o.heat_mode, parse_int);
        r.read(R4, 6, "PumpIdleTimer", &mut o.pump_idle_timer, parse_int);
        r.read(R4, 7, "PumpRunTimer", &mut o.pump_run_timer, parse_int);
        r.read(R4, 8, "AdtPoolHys", &mut o.pool_hysteresis, parse_int);
        r.read(R4, 9, "AdtHeaterHys", &mut o.heater_hysteresis, parse_int);
        r.read(R4, 10, "Power", &mut o.power, parse_int);
        r.read(R4, 11, "Power_kWh", &mut o.power_kwh, parse_int);
        r.read(R4, 12, "Power_Today", &mut o.power_today, parse_int);
        r.read(R4, 13, "Power_Yesterday", &mut o.power_yesterday, parse_int);
        r.read(R4, 14, "ThermalCutOut", &mut o.thermal_cut_out, parse_int);
        for (i, test) in o.test_switches.iter_mut().enumerate() {
            r.read(R4, 15 + i, "Test_D", test, parse_flag);
        }
        r.read(R4, 18, "ElementHeatSourceOffset", &mut o.element_heat_source_offset, parse_int);
        r.read(R4, 19, "Frequency", &mut o.frequency, parse_int);
        r.read(R4, 20, "HPHeatSourceOffset_Heat", &mut o.hp_heat_source_offset_heat, parse_int);
        r.read(R4, 21, "HPHeatSourceOffset_Cool", &mut o.hp_heat_source_offset_cool, parse_int);
        r.read(R4, 22, "HeatSourceOffTime", &mut o.heat_source_off_time, parse_int);
        r.read(R4, 23, "Vari_Mode", &mut o.vari_mode, parse_int);
        r.read(R4, 24, "Vari_Speed", &mut o.vari_speed, parse_int);
        r.read(R4, 25, "Vari_Percent", &mut o.vari_percent, parse_int);
    }

    fn decode_touch_pad(&mut self, r: &FieldReader<'_>) {
        let t = &mut self.touch_pad;
        r.read(R5, 10, "RB_TP_Sleep", &mut t.sleeping, parse_flag);
        r.read(R5, 11, "RB_TP_Ozone", &mut t.ozone, parse_flag);
        r.read(R5, 12, "RB_TP_Heater", &mut t.heater, parse_flag);
        r.read(R5, 13, "RB_TP_Auto", &mut t.auto, parse_flag);
        r.read(R5, 15, "WTMP", &mut t.water_temperature, parse_tenths);
        r.read(R5, 16, "CleanCycle", &mut t.clean_cycle, parse_flag);
    }

    fn decode_settings(&mut self, r: &FieldReader<'_>) {
        let s = &mut self.settings;
        r.read(R6, 1, "VARIValue", &mut s.vari_value, parse_int);
        r.read(R6, 2, "LBRTValue", &mut s.light_brightness, parse_int);
        r.read(R6, 3, "CurrClr", &mut s.light_colour, parse_int);
        r.read(R6, 4, "ColorMode", &mut s.light_colour_mode, parse_int);
        r.read(R6, 5, "LSPDValue", &mut s.light_speed, parse_int);
        r.read(R6, 6, "FiltSetHrs", &mut s.filter_hours, parse_int);
        r.read(R6, 7, "FiltBlockHrs", &mut s.filter_block_hours, parse_int);
        r.read(R6, 8, "STMP", &mut s.set_temperature, parse_tenths);
        r.read(R6, 9, "L_24HOURS", &mut s.clock_24_hours, parse_int);
        r.read(R6, 10, "PSAV_LVL", &mut s.power_save_level, parse_int);
        r.read(R6, 11, "PSAV_BGN", &mut s.power_save_begin, parse_int);
        r.read(R6, 12, "PSAV_END", &mut s.power_save_end, parse_int);
        r.read(R6, 13, "L_1SNZ_DAY", &mut s.sleep_1_days, parse_int);
        r.read(R6, 14, "L_2SNZ_DAY", &mut s.sleep_2_days, parse_int);
        r.read(R6, 15, "L_1SNZ_BGN", &mut s.sleep_1_begin, parse_int);
        r.read(R6, 16, "L_2SNZ_BGN", &mut s.sleep_2_begin, parse_int);
        r.read(R6, 17, "L_1SNZ_END", &mut s.sleep_1_end, parse_int);
        r.read(R6, 18, "L_2SNZ_END", &mut s.sleep_2_end, parse_int);
        r.read(R6, 19, "DefaultScrn", &mut s.default_screen, parse_int);
        r.read(R6, 20, "TOUT", &mut s.touch_timeout, parse_int);
        r.read(R6, 21, "VPMP", &mut s.variable_pump, parse_flag);
        r.read(R6, 22, "HIFI", &mut s.hifi, parse_flag);
        r.read(R6, 23, "BRND", &mut s.brand, parse_int);
        r.read(R6, 24, "PRME", &mut s.prime, parse_int);
        r.read(R6, 25, "ELMT", &mut s.element, parse_int);
        r.read(R6, 26, "TYPE", &mut s.spa_type, parse_int);
        r.read(R6, 27, "GAS", &mut s.gas, parse_int);
    }

    fn decode_options(&mut self, r: &FieldReader<'_>) {
        let o = &mut self.options;
        r.read(R7, 1, "WCLNTime", &mut o.clean_time, parse_int);
        // R7+2 and R7+3 may be swapped on some firmware.
        r.read(R7, 2, "OzoneOff", &mut o.ozone_off, parse_flag);
        r.read(R7, 3, "TemperatureUnits", &mut o.temperature_units, parse_int);
        r.read(R7, 4, "Ozone24", &mut o.ozone_24, parse_flag);
        r.read(R7, 5, "CJET", &mut o.cjet, parse_flag);
        r.read(R7, 6, "Circ24", &mut o.circ_24, parse_flag);
        r.read(R7, 7, "VELE", &mut o.element_mode, ElementMode::parse);
        // R7+8..R7+10 hold the install date; not decoded.
        r.read(R7, 11, "V_Max", &mut o.voltage_max, parse_int);
        r.read(R7, 12, "V_Min", &mut o.voltage_min, parse_int);
        r.read(R7, 13, "V_Max_24", &mut o.voltage_max_24, parse_int);
        r.read(R7, 14, "V_Min_24", &mut o.voltage_min_24, parse_int);
        r.read(R7, 15, "CurrentZero", &mut o.current_zero, parse_int);
        r.read(R7, 16, "CurrentAdjust", &mut o.current_adjust, parse_int);
        r.read(R7, 17, "VoltageAdjust", &mut o.voltage_adjust, parse_int);
        for (i, interval) in o.service_intervals.iter_mut().enumerate() {
            r.read(R7, 19 + i, "Ser", interval, parse_int);
        }
        r.read(R7, 22, "VMAX", &mut o.vmax, parse_int);
        r.read(R7, 23, "AHYS", &mut o.auto_hysteresis, parse_int);
        r.read(R7, 24, "HUSE", &mut o.heat_pump_in_use, parse_flag);
        r.read(R7, 25, "HELE", &mut o.element_boost, parse_int);
        r.read(R7, 26, "HPMP", &mut o.heat_pump_mode, HeatPumpMode::parse);
        r.read(R7, 27, "PMIN", &mut o.pump_power_min, parse_int);
        r.read(R7, 28, "PFLT", &mut o.pump_power_filter, parse_int);
        r.read(R7, 29, "PHTR", &mut o.pump_power_heater, parse_int);
        r.read(R7, 30, "PMAX", &mut o.pump_power_max, parse_int);
    }

    fn decode_heat_pump(&mut self, r: &FieldReader<'_>) {
        let h = &mut self.heat_pump;
        r.read(RE, 1, "HP_Present", &mut h.present, parse_flag);
        r.read(RE, 10, "HP_Ambient", &mut h.ambient, parse_int);
        r.read(RE, 11, "HP_Condensor", &mut h.condensor, parse_int);
        r.read(RE, 12, "HP_Compressor_State", &mut h.compressor_on, parse_flag);
        r.read(RE, 13, "HP_Fan_State", &mut h.fan_on, parse_flag);
        r.read(RE, 14, "HP_4W_Valve", &mut h.four_way_valve, parse_flag);
        r.read(RE, 15, "HP_Heater_State", &mut h.heater_on, parse_flag);
        r.read(RE, 16, "HP_State", &mut h.state, parse_int);
        r.read(RE, 17, "HP_Mode", &mut h.mode, parse_int);
        r.read(RE, 18, "HP_Defrost_Timer", &mut h.defrost_timer, parse_int);
        r.read(RE, 19, "HP_Comp_Run_Timer", &mut h.compressor_run_timer, parse_int);
        r.read(RE, 20, "HP_Low_Temp_Timer", &mut h.low_temp_timer, parse_int);
        r.read(RE, 21, "HP_Heat_Accum_Timer", &mut h.heat_accum_timer, parse_int);
        r.read(RE, 22, "HP_Sequence_Timer", &mut h.sequence_timer, parse_int);
        r.read(RE, 23, "HP_Warning", &mut h.warning, parse_int);
        r.read(RE, 24, "FrezTmr", &mut h.freeze_timer, parse_int);
        r.read(RE, 25, "DBGN", &mut h.defrost_begin, parse_int);
        r.read(RE, 26, "DEND", &mut h.defrost_end, parse_int);
        r.read(RE, 27, "DCMP", &mut h.defrost_compressor, parse_int);
        r.read(RE, 28, "DMAX", &mut h.defrost_max, parse_int);
        r.read(RE, 29, "DELE", &mut h.defrost_element, parse_int);
        r.read(RE, 30, "DPMP", &mut h.defrost_pump, parse_int);
    }

    fn decode_pumps(&mut self, r: &FieldReader<'_>) {
        for (i, pump) in self.pumps.iter_mut().enumerate() {
            r.read(R5, 18 + i, "RB_TP_Pump", &mut pump.mode, parse_int);
            r.read(RG, 1 + i, "PumpOkToRun", &mut pump.ok_to_run, parse_flag);
            r.read(RG, 7 + i, "PumpInstallState", &mut pump.install_state, parse_text);
        }
        r.read(RG, 12, "LockMode", &mut self.lock_mode, parse_int);
    }
}

fn decode_fault(r: &FieldReader<'_>, marker: SectionMarker, f: &mut FaultEntry) {
    r.read(marker, 2, "F_HR", &mut f.hour_meter, parse_int);
    r.read(marker, 3, "F_Time", &mut f.time, parse_text);
    r.read(marker, 4, "F_ER", &mut f.error, parse_int);
    r.read(marker, 5, "F_I", &mut f.current, parse_int);
    r.read(marker, 6, "F_V", &mut f.voltage, parse_int);
    r.read(marker, 7, "F_PT", &mut f.pool_temperature, parse_int);
    r.read(marker, 8, "F_HT", &mut f.heater_temperature, parse_int);
    r.read(marker, 9, "F_CT", &mut f.case_temperature, parse_int);
    r.read(marker, 10, "F_PU", &mut f.pump, parse_int);
    r.read(marker, 11, "F_VE", &mut f.element, parse_int);
    r.read(marker, 12, "F_ST", &mut f.status, parse_int);
}
