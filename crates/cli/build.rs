use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("webtome")
        .version("0.1.0")
        .author("Webtome Contributors")
        .about("Convert web pages into EPUB, HTML, or MOBI ebooks")
        .arg(clap::arg!(<INPUT> "URL to convert, or a local HTML file"))
        .arg(
            clap::arg!(-f --format <FORMAT> "Output formats (epub, html, mobi)")
                .value_name("FORMAT")
                .default_value("epub")
                .value_delimiter(',')
                .value_parser(["epub", "html", "mobi"]),
        )
        .arg(
            clap::arg!(-o --output <DIR> "Output directory")
                .value_name("DIR")
                .default_value(".")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-t --title <TITLE> "Override the book title"))
        .arg(clap::arg!(--crawl "Follow same-site links from the seed page"))
        .arg(clap::arg!(--"max-pages" <NUM> "Maximum pages to crawl").default_value("50"))
        .arg(clap::arg!(--"content-selector" <SELECTOR> "CSS selector for the content root"))
        .arg(clap::arg!(--"exclude-selector" <SELECTOR> "CSS selectors to drop from extracted content"))
        .arg(clap::arg!(--include <PATTERN> "URL pattern a crawled link must match"))
        .arg(
            clap::arg!(--"include-file" <FILE> "File with include patterns, one per line")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--exclude <PATTERN> "URL pattern that blocks a crawled link"))
        .arg(
            clap::arg!(--"exclude-file" <FILE> "File with exclude patterns, one per line")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(--cover <FILE> "Use an image file as the cover instead of generating one")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--"no-cover" "Produce no cover at all"))
        .arg(clap::arg!(--"drop-empty-pages" "Drop crawled pages with no readable content"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "webtome", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "webtome", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "webtome", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "webtome", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
