use console::style;
use gocrete::Registry;
use miette::Result;

pub fn run() -> Result<()> {
    let registry = Registry::builtin();

    println!("{}", style("Available modules:").bold());
    for (category, name, module) in registry.entries() {
        let key = if name.is_empty() {
            category.to_string()
        } else {
            format!("{category} --{} {name}", selector_flag(category))
        };
        println!(
            "  {:<28} {} {}",
            style(key).cyan(),
            module.name(),
            style(format!("({})", module.bundle())).dim()
        );
    }
    Ok(())
}

fn selector_flag(category: &str) -> &'static str {
    match category {
        "openapi" => "mode",
        _ => "type",
    }
}
