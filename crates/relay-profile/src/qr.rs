use base64::{engine::general_purpose::STANDARD, Engine};
use qrcode::QrCode;

use crate::error::{ProfileError, Result};

/// Render a share URI as an SVG QR code.
pub fn generate_qr_svg(content: &str) -> Result<String> {
    let code = QrCode::new(content).map_err(|e| ProfileError::QrCode(e.to_string()))?;
    let svg = code
        .render::<qrcode::render::svg::Color>()
        .min_dimensions(300, 300)
        .build();
    Ok(svg)
}

/// QR code as a `data:` URI for inline embedding in the share page.
pub fn generate_qr_data_uri(content: &str) -> Result<String> {
    let svg = generate_qr_svg(content)?;
    Ok(format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(svg.as_bytes())
    ))
}
