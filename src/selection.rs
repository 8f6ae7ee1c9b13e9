use crate::inventory::DeviceRecord;
use thiserror::Error;

/// Which subset of the inventory an operation acts on. Ordinals are 1-based
/// positions in the inventory's declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    All,
    One(usize),
    Many(Vec<usize>),
}

/// Resolves a selection against the inventory. The result keeps the
/// inventory's declaration order regardless of the order ordinals were given
/// in, and an out-of-range ordinal is an error, never a silent miss.
pub fn resolve(devices: &[DeviceRecord], selection: &Selection) -> Result<Vec<DeviceRecord>, SelectionError> {
    let ordinals = match selection {
        Selection::All => return Ok(devices.to_vec()),
        Selection::One(ordinal) => std::slice::from_ref(ordinal),
        Selection::Many(ordinals) => ordinals.as_slice(),
    };

    if ordinals.is_empty() {
        return Err(SelectionError::Empty);
    }

    for &ordinal in ordinals {
        if ordinal == 0 || ordinal > devices.len() {
            return Err(SelectionError::OutOfRange {
                ordinal,
                count: devices.len(),
            });
        }
    }

    Ok(devices
        .iter()
        .enumerate()
        .filter(|(index, _)| ordinals.contains(&(index + 1)))
        .map(|(_, device)| device.clone())
        .collect())
}

/// Parses a single 1-based ordinal.
pub fn parse_ordinal(input: &str) -> Result<usize, SelectionError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SelectionError::Empty);
    }

    trimmed.parse().map_err(|_| SelectionError::InvalidOrdinal(trimmed.to_string()))
}

/// Parses a comma-separated ordinal list, tolerating whitespace around the
/// separators ("1, 3" selects devices 1 and 3).
pub fn parse_ordinals(input: &str) -> Result<Vec<usize>, SelectionError> {
    if input.trim().is_empty() {
        return Err(SelectionError::Empty);
    }

    input.split(',').map(parse_ordinal).collect()
}

#[derive(Error, Debug, PartialEq)]
pub enum SelectionError {
    #[error("device {ordinal} does not exist, the inventory has {count} devices")]
    OutOfRange { ordinal: usize, count: usize },
    #[error("'{0}' is not a device number")]
    InvalidOrdinal(String),
    #[error("no devices selected")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn inventory() -> Vec<DeviceRecord> {
        ["sonoff_kitchen", "bulb_hallway", "plug_office"]
            .iter()
            .map(|id| DeviceRecord {
                id: id.to_string(),
                host: format!("{id}.local"),
                name: id.to_string(),
                username: "admin".to_string(),
                password: "hunter2".to_string(),
                variant: None,
            })
            .collect()
    }

    #[test]
    fn resolve_all_returns_every_device_in_declaration_order() -> Result<(), SelectionError> {
        let devices = inventory();

        let selected = resolve(&devices, &Selection::All)?;

        assert_eq!(selected, devices);
        Ok(())
    }

    #[test]
    fn resolve_one_picks_the_device_at_the_ordinal() -> Result<(), SelectionError> {
        let selected = resolve(&inventory(), &Selection::One(2))?;

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "bulb_hallway");
        Ok(())
    }

    #[rstest]
    #[case(0)]
    #[case(4)]
    fn resolve_one_rejects_an_out_of_range_ordinal(#[case] ordinal: usize) {
        let result = resolve(&inventory(), &Selection::One(ordinal));

        assert_eq!(result, Err(SelectionError::OutOfRange { ordinal, count: 3 }));
    }

    #[test]
    fn resolve_many_keeps_the_inventory_order() -> Result<(), SelectionError> {
        let selected = resolve(&inventory(), &Selection::Many(vec![3, 1]))?;

        let ids = selected.iter().map(|device| device.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["sonoff_kitchen", "plug_office"]);
        Ok(())
    }

    #[test]
    fn resolve_many_rejects_a_list_with_an_out_of_range_ordinal() {
        let result = resolve(&inventory(), &Selection::Many(vec![1, 7]));

        assert_eq!(result, Err(SelectionError::OutOfRange { ordinal: 7, count: 3 }));
    }

    #[rstest]
    #[case("1, 3", vec![1, 3])]
    #[case("1,3", vec![1, 3])]
    #[case(" 2 ", vec![2])]
    fn parse_ordinals_tolerates_whitespace(#[case] input: &str, #[case] expected: Vec<usize>) {
        assert_eq!(parse_ordinals(input), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn parse_ordinals_rejects_empty_input(#[case] input: &str) {
        assert_eq!(parse_ordinals(input), Err(SelectionError::Empty));
    }

    #[test]
    fn parse_ordinals_rejects_a_non_numeric_token() {
        assert_eq!(
            parse_ordinals("1, two"),
            Err(SelectionError::InvalidOrdinal("two".to_string()))
        );
    }
}
