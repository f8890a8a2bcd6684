// src/device/parser.rs

/// One request line, tokenized. Keywords are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCommand<'a> {
    /// `NEC <HEX8>`
    Nec { code: u32 },
    /// `TX <freqHz> <us,us,...>`, also spelled `TRANSMIT`.
    Tx { freq_hz: u32, list: &'a str },
    /// `TXM <freqHz>`: start a multi-line pattern.
    Txm { freq_hz: u32 },
    /// `END`: finish a multi-line pattern.
    End,
    /// `RAW <b b b>`: legacy tick values.
    Raw { values: &'a str },
    /// `HELP` or `?`
    Help,
    /// `LAST_RECV`
    LastRecv,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("use: NEC <HEX8>, e.g. NEC 20DF10EF")]
    NecUsage,
    #[error("use: TX <freqHz> <us,us,...>")]
    TxUsage,
    #[error("use: TXM <freqHz>, then lists, then END")]
    TxmUsage,
    #[error("use: RAW <b b b>")]
    RawUsage,
    #[error("invalid freqHz")]
    BadFrequency,
    #[error("commands: NEC <hex8>, TX <freq> <us,...>, TXM <freq>, RAW <b b b>, LAST_RECV, HELP")]
    Unknown,
}

/// Splits off the first whitespace-delimited token.
fn split_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(|c: char| c.is_ascii_whitespace()) {
        Some(i) => (&s[..i], s[i..].trim_start()),
        None => (s, ""),
    }
}

fn parse_frequency(token: &str) -> Result<u32, CommandError> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CommandError::BadFrequency);
    }
    match token.parse::<u32>() {
        Ok(0) | Err(_) => Err(CommandError::BadFrequency),
        Ok(freq) => Ok(freq),
    }
}

/// Tokenizes one non-blank line.
pub fn parse_command(line: &str) -> Result<DeviceCommand<'_>, CommandError> {
    let (keyword, rest) = split_token(line.trim());
    let is = |name: &str| keyword.eq_ignore_ascii_case(name);

    if is("NEC") {
        let (hex, extra) = split_token(rest);
        if hex.len() != 8 || !extra.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CommandError::NecUsage);
        }
        let code = u32::from_str_radix(hex, 16).map_err(|_| CommandError::NecUsage)?;
        Ok(DeviceCommand::Nec { code })
    } else if is("TX") || is("TRANSMIT") {
        let (freq, list) = split_token(rest);
        if freq.is_empty() || list.is_empty() {
            return Err(CommandError::TxUsage);
        }
        Ok(DeviceCommand::Tx {
            freq_hz: parse_frequency(freq)?,
            list,
        })
    } else if is("TXM") {
        let (freq, extra) = split_token(rest);
        if freq.is_empty() || !extra.is_empty() {
            return Err(CommandError::TxmUsage);
        }
        Ok(DeviceCommand::Txm {
            freq_hz: parse_frequency(freq)?,
        })
    } else if is("END") {
        Ok(DeviceCommand::End)
    } else if is("RAW") {
        if rest.is_empty() {
            return Err(CommandError::RawUsage);
        }
        Ok(DeviceCommand::Raw { values: rest })
    } else if is("HELP") || is("?") {
        Ok(DeviceCommand::Help)
    } else if is("LAST_RECV") {
        Ok(DeviceCommand::LastRecv)
    } else {
        Err(CommandError::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(parse_command("nec 20df10ef"), Ok(DeviceCommand::Nec { code: 0x20DF10EF }));
        assert_eq!(parse_command("Help"), Ok(DeviceCommand::Help));
        assert_eq!(parse_command("?"), Ok(DeviceCommand::Help));
        assert_eq!(parse_command("last_recv"), Ok(DeviceCommand::LastRecv));
        assert_eq!(parse_command("end"), Ok(DeviceCommand::End));
    }

    #[test]
    fn test_tx_and_alias() {
        let expected = DeviceCommand::Tx {
            freq_hz: 38_000,
            list: "9000, 4500,560",
        };
        assert_eq!(parse_command("TX 38000 9000, 4500,560"), Ok(expected.clone()));
        assert_eq!(parse_command("  transmit   38000 9000, 4500,560 "), Ok(expected));
        assert_eq!(parse_command("TX 38000"), Err(CommandError::TxUsage));
        assert_eq!(parse_command("TX 0 560"), Err(CommandError::BadFrequency));
        assert_eq!(parse_command("TX 38k 560"), Err(CommandError::BadFrequency));
    }

    #[test]
    fn test_txm() {
        assert_eq!(parse_command("TXM 36000"), Ok(DeviceCommand::Txm { freq_hz: 36_000 }));
        assert_eq!(parse_command("TXM"), Err(CommandError::TxmUsage));
        assert_eq!(parse_command("TXM 36000 100"), Err(CommandError::TxmUsage));
    }

    #[test]
    fn test_nec_usage() {
        assert_eq!(parse_command("NEC"), Err(CommandError::NecUsage));
        assert_eq!(parse_command("NEC 20DF10E"), Err(CommandError::NecUsage));
        assert_eq!(parse_command("NEC 20DF10EF 1"), Err(CommandError::NecUsage));
    }

    #[test]
    fn test_raw_and_unknown() {
        assert_eq!(
            parse_command("RAW 10 0x14 30"),
            Ok(DeviceCommand::Raw { values: "10 0x14 30" })
        );
        assert_eq!(parse_command("RAW"), Err(CommandError::RawUsage));
        assert_eq!(parse_command("BLINK"), Err(CommandError::Unknown));
    }
}
