use console::Style;
use nspi_core::fill::RegionSummary;
use nspi_core::pipeline::FillConfig;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_fill_summary(config: &FillConfig) {
    let s = Styles::new();
    let params = &config.params;

    println!();
    println!("  {}", s.title.apply_to("NSPI Cloud Fill"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(15)));
    println!();

    for (label, path) in [
        ("Cloudy", &config.cloudy),
        ("Clear", &config.clear),
        ("Mask", &config.mask),
        ("Output", &config.output),
    ] {
        println!(
            "  {:<14}{}",
            s.label.apply_to(label),
            s.path.apply_to(path.display())
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Export"),
        s.value.apply_to(format!(
            "{} .. {}",
            config.export_range.0, config.export_range.1
        ))
    );
    if config.mask_labeling.label {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Labeling"),
            s.method.apply_to(format!(
                "binary mask, invalid = {}",
                config.mask_labeling.invalid_value
            ))
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Parameters"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Classes"),
        s.value.apply_to(params.num_class)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Min Pixel"),
        s.value.apply_to(params.min_pixel)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Neighbors"),
        s.value.apply_to(format!("{} px", params.cloud_nbh))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("DN Range"),
        s.value.apply_to(format!("{} .. {}", params.dn_min, params.dn_max))
    );
    if params.parallel {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Regions"),
            s.method.apply_to("parallel")
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Regions"),
            s.disabled.apply_to("sequential")
        );
    }
    println!();
}

pub fn print_region_report(regions: &[RegionSummary]) {
    let s = Styles::new();

    println!();
    if regions.is_empty() {
        println!(
            "  {:<14}{}",
            s.header.apply_to("Regions"),
            s.disabled.apply_to("none, output equals input")
        );
        println!();
        return;
    }

    println!("  {}", s.header.apply_to("Regions"));
    for r in regions {
        let w = &r.window;
        println!(
            "    {:<6}{} cells, window {}x{}, {} donors, {} weighted, {} fallback",
            s.label.apply_to(r.code),
            s.value.apply_to(r.cells),
            w.rows(),
            w.cols(),
            r.candidates,
            s.method.apply_to(r.weighted),
            if r.fallback > 0 {
                s.disabled.apply_to(r.fallback)
            } else {
                s.value.apply_to(r.fallback)
            },
        );
    }

    let cells: usize = regions.iter().map(|r| r.cells).sum();
    let fallback: usize = regions.iter().map(|r| r.fallback).sum();
    println!(
        "    {:<6}{} cells filled, {} by fallback",
        s.label.apply_to("Total"),
        s.value.apply_to(cells),
        fallback
    );
    println!();
}
