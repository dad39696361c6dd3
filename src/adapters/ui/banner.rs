//! Neon ASCII banner with gradient (DRAMA STUDIO).

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Hot Pink (#ff2d95).
const HOT_PINK: (u8, u8, u8) = (0xff, 0x2d, 0x95);
/// Electric Blue (#3b82f6).
const ELECTRIC_BLUE: (u8, u8, u8) = (0x3b, 0x82, 0xf6);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Prints "DRAMA STUDIO" in the standard figlet font with a pink-to-blue gradient,
/// then the version and tagline. Falls back to a plain title if the font fails to load.
pub fn print_welcome() {
    let mut out = stdout();
    let art = FIGfont::standard()
        .ok()
        .and_then(|font| font.convert("DRAMA STUDIO").map(|f| f.to_string()))
        .unwrap_or_else(|| "DRAMA STUDIO".to_string());
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(HOT_PINK, ELECTRIC_BLUE, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: ELECTRIC_BLUE.0,
        g: ELECTRIC_BLUE.1,
        b: ELECTRIC_BLUE.2,
    }));
    let _ = out.execute(Print(format!("v{}\r\n", version)));
    let _ = out.execute(Print("AI短剧推广工作台\r\n"));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
