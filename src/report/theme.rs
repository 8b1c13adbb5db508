use plotters::style::RGBColor;

use crate::model::entity::EntityType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStyle {
    pub color: RGBColor,
    pub marker: MarkerShape,
    pub size: i32,
}

/// Visual configuration for one draw call. Nothing here is process-global.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub figure_background: RGBColor,
    pub axes_background: RGBColor,
    pub foreground: RGBColor,
    pub legend_background: RGBColor,
    pub legend_border: RGBColor,
    pub grid_alpha: f64,
    pub reference_line_width: u32,
    pub font_family: &'static str,
    pub title_font_px: u32,
    pub axis_font_px: u32,
    pub tick_font_px: u32,
    pub airport: SeriesStyle,
    pub airline: SeriesStyle,
}

impl Theme {
    pub fn dark() -> Self {
        let black = RGBColor(0, 0, 0);
        let white = RGBColor(255, 255, 255);
        Self {
            figure_background: black,
            axes_background: black,
            foreground: white,
            legend_background: black,
            legend_border: white,
            grid_alpha: 0.3,
            reference_line_width: 1,
            font_family: "sans-serif",
            title_font_px: 24,
            axis_font_px: 18,
            tick_font_px: 14,
            airport: SeriesStyle {
                color: RGBColor(31, 119, 180),
                marker: MarkerShape::Circle,
                size: 5,
            },
            airline: SeriesStyle {
                color: RGBColor(255, 127, 14),
                marker: MarkerShape::Triangle,
                size: 6,
            },
        }
    }

    pub fn series_style(&self, entity_type: EntityType) -> SeriesStyle {
        match entity_type {
            EntityType::Airport => self.airport,
            EntityType::Airline => self.airline,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
