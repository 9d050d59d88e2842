use clap::Args;
use kdt_pcb::{ComponentSpec, DesignatorSource, Side};
use kdt_settings::Settings;

/// Per-run changes on top of the saved settings.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Horizontal key spacing in mm
    #[arg(long, value_name = "MM", allow_hyphen_values = true)]
    step_x: Option<f64>,

    /// Vertical key spacing in mm
    #[arg(long, value_name = "MM", allow_hyphen_values = true)]
    step_y: Option<f64>,

    /// Size of one key unit in the layout export, in pixels
    #[arg(long, value_name = "PX", allow_hyphen_values = true)]
    ref_unit: Option<f64>,

    /// Shift the whole layout along X, in mm
    #[arg(long, value_name = "MM", allow_hyphen_values = true)]
    offset_x: Option<f64>,

    /// Shift the whole layout along Y, in mm
    #[arg(long, value_name = "MM", allow_hyphen_values = true)]
    offset_y: Option<f64>,

    /// Negate key rotations (hosts that measure angles clockwise)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    invert_rotation: Option<bool>,

    /// Designate keys by layout index or by KDT label
    #[arg(long, value_name = "index|label")]
    designator: Option<DesignatorSource>,

    #[arg(long, value_name = "PATTERN")]
    switch_pattern: Option<String>,

    #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
    switch_orientation: Option<f64>,

    #[arg(long, value_name = "front|back")]
    switch_side: Option<Side>,

    /// Place diodes (true/false)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    diode: Option<bool>,

    #[arg(long, value_name = "PATTERN")]
    diode_pattern: Option<String>,

    /// Diode offset from the switch centre as X,Y in mm
    #[arg(long, value_name = "X,Y", allow_hyphen_values = true, value_parser = parse_offset)]
    diode_offset: Option<[f64; 2]>,

    #[arg(long, value_name = "DEG", allow_hyphen_values = true)]
    diode_orientation: Option<f64>,

    #[arg(long, value_name = "front|back")]
    diode_side: Option<Side>,

    /// Additional component as NAME:PATTERN[:X:Y[:ROT[:SIDE]]]; replaces the saved list
    #[arg(long = "component", value_name = "SPEC", value_parser = parse_component)]
    components: Vec<ComponentSpec>,

    /// Drop all saved additional components
    #[arg(long, conflicts_with = "components")]
    no_components: bool,
}

impl Overrides {
    pub fn apply(&self, settings: &mut Settings) {
        set(&mut settings.step_x_mm, self.step_x);
        set(&mut settings.step_y_mm, self.step_y);
        set(&mut settings.ref_unit_px, self.ref_unit);
        set(&mut settings.offset_x_mm, self.offset_x);
        set(&mut settings.offset_y_mm, self.offset_y);
        set(&mut settings.invert_rotation, self.invert_rotation);
        set(&mut settings.designator, self.designator);

        let switch = &mut settings.switch;
        set(&mut switch.pattern, self.switch_pattern.clone());
        set(&mut switch.orientation_deg, self.switch_orientation);
        set(&mut switch.side, self.switch_side);

        let diode = &mut settings.diode;
        set(&mut diode.enabled, self.diode);
        set(&mut diode.pattern, self.diode_pattern.clone());
        if let Some([x, y]) = self.diode_offset {
            diode.offset_x_mm = x;
            diode.offset_y_mm = y;
        }
        set(&mut diode.orientation_deg, self.diode_orientation);
        set(&mut diode.side, self.diode_side);

        if self.no_components {
            settings.additional.clear();
        } else if !self.components.is_empty() {
            settings.additional = self.components.clone();
        }
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

fn parse_offset(s: &str) -> Result<[f64; 2], String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got \"{s}\""))?;
    Ok([parse_number(x)?, parse_number(y)?])
}

fn parse_number(s: &str) -> Result<f64, String> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| format!("\"{s}\" is not a number"))
}

fn parse_component(s: &str) -> Result<ComponentSpec, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() < 2 || parts.len() > 6 || parts.len() == 3 {
        return Err(format!(
            "expected NAME:PATTERN[:X:Y[:ROT[:SIDE]]] but got \"{s}\""
        ));
    }
    let mut spec = ComponentSpec::new(parts[0], parts[1]);
    if parts.len() >= 4 {
        spec = spec.with_offset(parse_number(parts[2])?, parse_number(parts[3])?);
    }
    if let Some(rot) = parts.get(4) {
        spec = spec.with_orientation(parse_number(rot)?);
    }
    if let Some(side) = parts.get(5) {
        spec = spec.on_side(side.parse::<Side>().map_err(|e| e.to_string())?);
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_with_all_fields() {
        let c = parse_component("LED:LED{}:0:-4.7:180:Bottom").unwrap();
        assert_eq!(
            c,
            ComponentSpec::new("LED", "LED{}")
                .with_offset(0.0, -4.7)
                .with_orientation(180.0)
                .on_side(Side::Back)
        );
    }

    #[test]
    fn component_with_name_and_pattern_only() {
        let c = parse_component("Cap:C{}").unwrap();
        assert_eq!(c, ComponentSpec::new("Cap", "C{}"));
    }

    #[test]
    fn component_rejects_half_an_offset() {
        assert!(parse_component("LED:LED{}:1").is_err());
        assert!(parse_component("LED").is_err());
        assert!(parse_component("LED:LED{}:a:0").is_err());
        assert!(parse_component("LED:LED{}:0:0:0:left").is_err());
    }

    #[test]
    fn offset_pair() {
        assert_eq!(parse_offset("-2.5, 3").unwrap(), [-2.5, 3.0]);
        assert!(parse_offset("5").is_err());
    }

    #[test]
    fn overrides_only_touch_given_fields() {
        let mut settings = Settings::default();
        let overrides = Overrides {
            step_x: Some(18.0),
            diode: Some(false),
            diode_offset: Some([1.0, 2.0]),
            components: vec![ComponentSpec::new("LED", "LED{}")],
            ..Overrides::default()
        };
        overrides.apply(&mut settings);

        assert_eq!(settings.step_x_mm, 18.0);
        assert_eq!(settings.step_y_mm, 19.05);
        assert!(!settings.diode.enabled);
        assert_eq!(settings.diode.offset(), [1.0, 2.0]);
        assert_eq!(settings.additional.len(), 1);
        assert_eq!(settings.switch, Settings::default().switch);
    }

    #[test]
    fn no_components_clears_the_list() {
        let mut settings = Settings::default();
        settings.additional.push(ComponentSpec::new("LED", "LED{}"));
        Overrides {
            no_components: true,
            ..Overrides::default()
        }
        .apply(&mut settings);
        assert!(settings.additional.is_empty());
    }
}
