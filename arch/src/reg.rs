use std::str::FromStr;
use strum::{Display, EnumString};

// ----------------------------------------------------------------------------
// Pointer registers

/// The pointer registers X, Y and Z, i.e. the register pairs
/// r27:r26, r29:r28 and r31:r30.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Ptr {
    X,
    Y,
    Z,
}

impl Ptr {
    /// Number of the low half of the pair.
    pub fn number(self) -> u16 {
        match self {
            Ptr::X => 26,
            Ptr::Y => 28,
            Ptr::Z => 30,
        }
    }
}

/// Parses a pointer-register operand, `X`/`Y`/`Z` with an optional
/// trailing `+` for post-increment.
pub fn parse_ptr(s: &str) -> Result<(Ptr, bool), String> {
    let post_inc = s.ends_with('+');
    let name = s.trim_end_matches('+');
    let ptr = Ptr::from_str(name).map_err(|_| format!("`{s}` is not X, Y or Z"))?;
    Ok((ptr, post_inc))
}

// ----------------------------------------------------------------------------
// General purpose registers

/// Resolves `X`/`Y`/`Z` (optionally qualified with `(HIGH)` or `(LOW)`)
/// to the number of one half of the pair. Returns `None` when `s` does
/// not name a pointer register at all.
fn pointer_alias(s: &str) -> Result<Option<u16>, String> {
    let (name, qual) = match s.split_once('(') {
        Some((name, qual)) => (name, Some(qual)),
        None => (s, None),
    };
    let ptr = match Ptr::from_str(name) {
        Ok(ptr) => ptr,
        Err(_) => return Ok(None),
    };
    let mut num = ptr.number();
    match qual {
        Some("HIGH)") => num += 1,
        Some("LOW)") | None => {}
        Some(qual) => return Err(format!("unknown register qualifier `({qual}`")),
    }
    Ok(Some(num))
}

/// Parses a 5-bit register operand: `rN` with N in 0..=31, or a pointer
/// register alias (`Z` -> 30, `Z(HIGH)` -> 31, ...).
pub fn parse_reg5(s: &str) -> Result<u16, String> {
    if let Some(num) = pointer_alias(s)? {
        return Ok(num);
    }
    let digits = s
        .strip_prefix(['r', 'R'])
        .ok_or_else(|| format!("`{s}` is not a register"))?;
    let num = digits
        .parse::<u16>()
        .map_err(|_| format!("`{s}` is not a register"))?;
    if num > 31 {
        return Err(format!("register `{s}` does not exist"));
    }
    Ok(num)
}

/// Parses a register operand restricted to the upper half r16..=r31.
/// The returned field is already offset, `r16` -> 0.
pub fn parse_reg4(s: &str) -> Result<u16, String> {
    let num = parse_reg5(s)?;
    if num < 16 {
        return Err(format!("register `{s}` is not in r16..r31"));
    }
    Ok(num - 16)
}

/// Parses the register operand of ADIW/SBIW: one of r24, r26, r28, r30.
/// The returned field is the 2-bit pair index, `r24` -> 0.
pub fn parse_reg_pair(s: &str) -> Result<u16, String> {
    let num = parse_reg5(s)?;
    match num {
        24 | 26 | 28 | 30 => Ok((num - 24) / 2),
        _ => Err(format!("register `{s}` is not r24, r26, r28 or r30")),
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reg5() {
        assert_eq!(parse_reg5("r0"), Ok(0));
        assert_eq!(parse_reg5("R31"), Ok(31));
        assert_eq!(parse_reg5("x"), Ok(26));
        assert_eq!(parse_reg5("Y(LOW)"), Ok(28));
        assert_eq!(parse_reg5("Z(HIGH)"), Ok(31));
        assert!(parse_reg5("r32").is_err());
        assert!(parse_reg5("Z(MID)").is_err());
        assert!(parse_reg5("42").is_err());
    }

    #[test]
    fn reg4() {
        assert_eq!(parse_reg4("r16"), Ok(0));
        assert_eq!(parse_reg4("r31"), Ok(15));
        assert!(parse_reg4("r15").is_err());
    }

    #[test]
    fn reg_pair() {
        assert_eq!(parse_reg_pair("r24"), Ok(0));
        assert_eq!(parse_reg_pair("X"), Ok(1));
        assert_eq!(parse_reg_pair("r30"), Ok(3));
        assert!(parse_reg_pair("r25").is_err());
    }

    #[test]
    fn ptr() {
        assert_eq!(parse_ptr("Z"), Ok((Ptr::Z, false)));
        assert_eq!(parse_ptr("z+"), Ok((Ptr::Z, true)));
        assert_eq!(parse_ptr("X+"), Ok((Ptr::X, true)));
        assert!(parse_ptr("W").is_err());
    }
}
