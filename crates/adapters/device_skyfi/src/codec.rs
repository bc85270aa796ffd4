//! Wire codec for the `SkyFi` plain-text protocol.
//!
//! Responses look like `ret=OK,pow=1,mode=2,stemp=24.0,f_rate=A,f_dir=0`.
//! Field codes follow the controller firmware: `mode` 0 auto, 1 dry, 2 cool,
//! 3 heat, 4 fan-only; `f_rate` `A` auto, `B` quiet, `1`-`5` fixed levels;
//! `f_dir` 0 stopped, 1 vertical, 2 horizontal, 3 both.

use std::collections::HashMap;

use airsched_domain::control::{ControlState, FanDirection, FanRate, Mode, Power, Zone};
use airsched_domain::error::ConnectivityError;

/// Encode a control state as `set_control_info` query parameters.
#[must_use]
pub fn encode_control(state: &ControlState) -> Vec<(&'static str, String)> {
    vec![
        ("pow", encode_power(state.power).to_string()),
        ("mode", encode_mode(state.mode).to_string()),
        ("stemp", format!("{:.1}", state.target_temp)),
        ("f_rate", encode_fan_rate(state.fan_rate)),
        ("f_dir", encode_fan_direction(state.fan_direction).to_string()),
    ]
}

/// Parse a `get_control_info` response body.
///
/// # Errors
///
/// Returns [`ConnectivityError::Protocol`] if the body is not a well-formed
/// `key=value` list, reports a non-OK `ret`, or carries unknown field codes.
pub fn parse_control(body: &str) -> Result<ControlState, ConnectivityError> {
    let fields = split_fields(body)?;
    ensure_ok(&fields)?;

    let power = match require(&fields, "pow")? {
        "0" => Power::Off,
        "1" => Power::On,
        other => return Err(unknown("pow", other)),
    };
    let mode = match require(&fields, "mode")? {
        "0" => Mode::Auto,
        "1" => Mode::Dry,
        "2" => Mode::Cool,
        "3" => Mode::Heat,
        "4" => Mode::FanOnly,
        other => return Err(unknown("mode", other)),
    };
    let stemp = require(&fields, "stemp")?;
    let target_temp: f32 = stemp.parse().map_err(|_| unknown("stemp", stemp))?;
    let fan_rate = parse_fan_rate(require(&fields, "f_rate")?)?;
    let fan_direction = match require(&fields, "f_dir")? {
        "0" => FanDirection::Stopped,
        "1" => FanDirection::Vertical,
        "2" => FanDirection::Horizontal,
        "3" => FanDirection::Both,
        other => return Err(unknown("f_dir", other)),
    };

    Ok(ControlState {
        power,
        mode,
        target_temp,
        fan_rate,
        fan_direction,
    })
}

/// Encode zone state as `set_zone_setting` query parameters.
///
/// Names and on/off flags travel as two parallel semicolon-separated lists.
#[must_use]
pub fn encode_zones(zones: &[Zone]) -> Vec<(&'static str, String)> {
    let names: Vec<&str> = zones.iter().map(|z| z.name.as_str()).collect();
    let flags: Vec<&str> = zones.iter().map(|z| if z.on { "1" } else { "0" }).collect();
    vec![
        ("zone_name", names.join(";")),
        ("zone_onoff", flags.join(";")),
    ]
}

/// Parse a `get_zone_setting` response body.
///
/// # Errors
///
/// Returns [`ConnectivityError::Protocol`] if the body is malformed, reports
/// a non-OK `ret`, or the two zone lists disagree in length.
pub fn parse_zones(body: &str) -> Result<Vec<Zone>, ConnectivityError> {
    let fields = split_fields(body)?;
    ensure_ok(&fields)?;

    let names = require(&fields, "zone_name")?;
    let flags = require(&fields, "zone_onoff")?;
    if names.is_empty() && flags.is_empty() {
        return Ok(Vec::new());
    }

    let names: Vec<&str> = names.split(';').collect();
    let flags: Vec<&str> = flags.split(';').collect();
    if names.len() != flags.len() {
        return Err(ConnectivityError::Protocol(format!(
            "zone list length mismatch: {} names, {} flags",
            names.len(),
            flags.len()
        )));
    }

    names
        .into_iter()
        .zip(flags)
        .map(|(name, flag)| match flag {
            "0" => Ok(Zone::new(name, false)),
            "1" => Ok(Zone::new(name, true)),
            other => Err(unknown("zone_onoff", other)),
        })
        .collect()
}

/// Check that a write response acknowledged the command.
///
/// # Errors
///
/// Returns [`ConnectivityError::Protocol`] if the body is malformed or `ret`
/// is missing or not `OK`.
pub fn ensure_ack(body: &str) -> Result<(), ConnectivityError> {
    let fields = split_fields(body)?;
    ensure_ok(&fields)
}

fn split_fields(body: &str) -> Result<HashMap<&str, &str>, ConnectivityError> {
    body.trim()
        .split(',')
        .map(|part| {
            part.split_once('=')
                .ok_or_else(|| ConnectivityError::Protocol(format!("malformed field: {part:?}")))
        })
        .collect()
}

fn ensure_ok(fields: &HashMap<&str, &str>) -> Result<(), ConnectivityError> {
    match fields.get("ret") {
        Some(&"OK") => Ok(()),
        Some(other) => Err(ConnectivityError::Protocol(format!(
            "device refused command: ret={other}"
        ))),
        None => Err(ConnectivityError::Protocol(
            "response missing ret field".to_string(),
        )),
    }
}

fn require<'a>(
    fields: &HashMap<&str, &'a str>,
    key: &str,
) -> Result<&'a str, ConnectivityError> {
    fields
        .get(key)
        .copied()
        .ok_or_else(|| ConnectivityError::Protocol(format!("response missing {key} field")))
}

fn unknown(key: &str, value: &str) -> ConnectivityError {
    ConnectivityError::Protocol(format!("unknown {key} value: {value:?}"))
}

fn encode_power(power: Power) -> &'static str {
    match power {
        Power::Off => "0",
        Power::On => "1",
    }
}

fn encode_mode(mode: Mode) -> &'static str {
    match mode {
        Mode::Auto => "0",
        Mode::Dry => "1",
        Mode::Cool => "2",
        Mode::Heat => "3",
        Mode::FanOnly => "4",
    }
}

fn encode_fan_rate(rate: FanRate) -> String {
    match rate {
        FanRate::Auto => "A".to_string(),
        FanRate::Quiet => "B".to_string(),
        FanRate::Level(level) => level.to_string(),
    }
}

fn parse_fan_rate(value: &str) -> Result<FanRate, ConnectivityError> {
    match value {
        "A" => Ok(FanRate::Auto),
        "B" => Ok(FanRate::Quiet),
        other => match other.parse() {
            Ok(level @ 1..=5) => Ok(FanRate::Level(level)),
            _ => Err(unknown("f_rate", other)),
        },
    }
}

fn encode_fan_direction(direction: FanDirection) -> &'static str {
    match direction {
        FanDirection::Stopped => "0",
        FanDirection::Vertical => "1",
        FanDirection::Horizontal => "2",
        FanDirection::Both => "3",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_control_info_response() {
        let state = parse_control("ret=OK,pow=1,mode=2,stemp=23.0,f_rate=3,f_dir=0").unwrap();
        assert_eq!(state.power, Power::On);
        assert_eq!(state.mode, Mode::Cool);
        assert!((state.target_temp - 23.0).abs() < f32::EPSILON);
        assert_eq!(state.fan_rate, FanRate::Level(3));
        assert_eq!(state.fan_direction, FanDirection::Stopped);
    }

    #[test]
    fn should_parse_integer_temperature() {
        let state = parse_control("ret=OK,pow=0,mode=0,stemp=23,f_rate=A,f_dir=3").unwrap();
        assert!((state.target_temp - 23.0).abs() < f32::EPSILON);
        assert_eq!(state.fan_rate, FanRate::Auto);
    }

    #[test]
    fn should_encode_control_state_as_query_parameters() {
        let state = ControlState {
            power: Power::On,
            mode: Mode::Heat,
            target_temp: 21.5,
            fan_rate: FanRate::Quiet,
            fan_direction: FanDirection::Vertical,
        };
        assert_eq!(
            encode_control(&state),
            vec![
                ("pow", "1".to_string()),
                ("mode", "3".to_string()),
                ("stemp", "21.5".to_string()),
                ("f_rate", "B".to_string()),
                ("f_dir", "1".to_string()),
            ]
        );
    }

    #[test]
    fn should_reject_non_ok_ret() {
        let err = parse_control("ret=PARAM NG,pow=1,mode=2,stemp=24.0,f_rate=A,f_dir=0");
        assert!(matches!(err, Err(ConnectivityError::Protocol(_))));
        assert!(ensure_ack("ret=ADV NG").is_err());
        assert!(ensure_ack("ret=OK").is_ok());
    }

    #[test]
    fn should_reject_unknown_mode_code() {
        let err = parse_control("ret=OK,pow=1,mode=9,stemp=24.0,f_rate=A,f_dir=0");
        assert!(matches!(err, Err(ConnectivityError::Protocol(_))));
    }

    #[test]
    fn should_reject_out_of_range_fan_level() {
        for rate in ["0", "7", "12"] {
            let body = format!("ret=OK,pow=1,mode=2,stemp=24.0,f_rate={rate},f_dir=0");
            assert!(matches!(
                parse_control(&body),
                Err(ConnectivityError::Protocol(_))
            ));
        }
    }

    #[test]
    fn should_reject_malformed_body() {
        assert!(parse_control("not a skyfi response").is_err());
    }

    #[test]
    fn should_parse_parallel_zone_lists() {
        let zones =
            parse_zones("ret=OK,zone_onoff=1;0;1,zone_name=Living Room;Bedroom;Kitchen").unwrap();
        assert_eq!(
            zones,
            vec![
                Zone::new("Living Room", true),
                Zone::new("Bedroom", false),
                Zone::new("Kitchen", true),
            ]
        );
    }

    #[test]
    fn should_reject_zone_lists_of_different_lengths() {
        let err = parse_zones("ret=OK,zone_onoff=1;0,zone_name=Living Room");
        assert!(matches!(err, Err(ConnectivityError::Protocol(_))));
    }

    #[test]
    fn should_encode_zones_as_parallel_lists() {
        let zones = [Zone::new("Living Room", true), Zone::new("Bedroom", false)];
        assert_eq!(
            encode_zones(&zones),
            vec![
                ("zone_name", "Living Room;Bedroom".to_string()),
                ("zone_onoff", "1;0".to_string()),
            ]
        );
    }
}
