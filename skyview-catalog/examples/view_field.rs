use skyview_catalog::view::{Camera, CatalogFile, ViewParams};

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .expect("Usage: view_field <catalog.skyv>");

    let file = CatalogFile::open(&path)?;
    println!("{}", file.header());

    // Orion, 40 degrees across.
    let camera = Camera::from_ra_dec(5.6, -1.2, 40.0)?;
    let params = ViewParams {
        max_level: 4,
        ..ViewParams::default()
    };

    let view = file.view(&camera, &params)?;
    println!(
        "\n{} stars within {:.1}° of the view center:\n",
        view.len(),
        view.frame_angle.to_degrees(),
    );

    for star in view.stars.iter().take(20) {
        println!(
            "  az {:+8.3}°  r {:.4}  weight {:.3}  rgb({}, {}, {})",
            star.azimuth.to_degrees(),
            star.radius,
            star.weight,
            star.color.r,
            star.color.g,
            star.color.b,
        );
    }

    Ok(())
}
