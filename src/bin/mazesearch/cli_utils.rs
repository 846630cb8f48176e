use terramaze::config::range_types::NoiseScale;
use terramaze::errors::{MazeError, MazeResult};

/// Generic parser for delimited strings that return fixed-size arrays
pub fn parse_delimited<T, const N: usize>(
    input: &str,
    delimiter: char,
    type_name: &str,
    parser: impl Fn(&str) -> Result<T, std::num::ParseIntError>,
) -> MazeResult<[T; N]>
where
    T: Copy + Default,
{
    let parts: Vec<&str> = input.split(delimiter).collect();
    if parts.len() != N {
        return Err(MazeError::invalid_config(format!(
            "Invalid {type_name} format '{input}'. Expected {N} {delimiter}-separated values"
        )));
    }

    let mut result = [T::default(); N];
    for (i, part) in parts.iter().enumerate() {
        result[i] = parser(part.trim()).map_err(|_| {
            MazeError::invalid_config(format!("Invalid {type_name} value: '{part}'"))
        })?;
    }

    Ok(result)
}

/// Parse size string "WIDTHxHEIGHT" with validation
pub fn parse_size(size_str: &str) -> MazeResult<(u32, u32)> {
    let [width, height] = parse_delimited::<u32, 2>(size_str, 'x', "size", |s| s.parse())?;

    if width < 3 || height < 3 {
        return Err(MazeError::invalid_config(
            "Width and height must be at least 3",
        ));
    }

    if width > 2048 || height > 2048 {
        return Err(MazeError::invalid_config(
            "Width and height must not exceed 2048",
        ));
    }

    Ok((width, height))
}

/// Parse a seed given as decimal or `0x`-prefixed hex
pub fn parse_seed(seed_str: &str) -> MazeResult<u32> {
    let trimmed = seed_str.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse(),
    };
    parsed.map_err(|_| MazeError::invalid_config(format!("Invalid seed '{seed_str}'")))
}

pub fn parse_scale(scale: f64) -> MazeResult<NoiseScale> {
    NoiseScale::new(scale)
}
