use clap::{Parser as ClapParser, Subcommand};
use modelview::platform::memory::MemoryContainer;
use modelview::scene::{
    resources, ClickPayload, ModelSource, ViewerState, GLTF_BINARY_MIME, VIEWER_TAG,
};
use modelview::{bind, LocalModel, ViewerEvent};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(ClapParser)]
#[command(name = "modelview")]
#[command(about = "Inspect and render <model-viewer> widget state")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a model file as a data URI
    Encode {
        /// Path to the model file
        file: PathBuf,
        /// MIME type written into the URI
        #[arg(long, default_value = GLTF_BINARY_MIME)]
        mime: String,
    },
    /// Print widget state as JSON
    State {
        /// Model URL or local file (embedded as a data URI)
        #[arg(long)]
        src: Option<String>,
        #[arg(long)]
        alt: Option<String>,
        #[arg(long)]
        poster: Option<String>,
        #[arg(long)]
        auto_rotate: bool,
        #[arg(long)]
        no_camera_controls: bool,
        /// CSS property as key=value, repeatable
        #[arg(long = "style", value_parser = parse_key_value)]
        styles: Vec<(String, String)>,
        /// Extra attribute as key=value, repeatable
        #[arg(long = "attr", value_parser = parse_key_value)]
        attrs: Vec<(String, String)>,
    },
    /// Bind a state file to an in-memory viewer and print the markup
    Render {
        /// Path to a JSON state file
        file: PathBuf,
        /// Simulated click as X,Y or X,Y,TAG, repeatable
        #[arg(long = "click", value_parser = parse_click)]
        clicks: Vec<ClickPayload>,
    },
    /// Print the scripts a page needs to load
    Resources,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encode { file, mime } => encode(&file, &mime),
        Commands::State {
            src,
            alt,
            poster,
            auto_rotate,
            no_camera_controls,
            styles,
            attrs,
        } => build_state(src, alt, poster, auto_rotate, !no_camera_controls, styles, attrs)
            .and_then(|state| to_json(&state)),
        Commands::Render { file, clicks } => render(&file, clicks),
        Commands::Resources => Ok(resources_json()),
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn encode(file: &Path, mime: &str) -> Result<String, String> {
    ModelSource::Path(file.to_path_buf())
        .resolve_with_mime(mime)
        .map_err(|e| e.to_string())
}

/// A `src` naming an existing file is inlined; anything else is a URL.
fn build_state(
    src: Option<String>,
    alt: Option<String>,
    poster: Option<String>,
    auto_rotate: bool,
    camera_controls: bool,
    styles: Vec<(String, String)>,
    attrs: Vec<(String, String)>,
) -> Result<ViewerState, String> {
    let mut state = ViewerState::default()
        .with_auto_rotate(auto_rotate)
        .with_camera_controls(camera_controls);

    if let Some(src) = src {
        let source = if Path::new(&src).is_file() {
            log::debug!("inlining model file {}", src);
            ModelSource::Path(PathBuf::from(src))
        } else {
            log::debug!("using '{}' as a URL", src);
            ModelSource::Url(src)
        };
        state = state.with_source(source).map_err(|e| e.to_string())?;
    }
    if let Some(alt) = alt {
        state = state.with_alt(alt);
    }
    if let Some(poster) = poster {
        state = state.with_poster(poster);
    }
    for (property, value) in styles {
        state = state.with_style(property, value);
    }
    for (name, value) in attrs {
        state = state.with_html_attr(name, value);
    }
    Ok(state)
}

fn render(file: &Path, clicks: Vec<ClickPayload>) -> Result<String, String> {
    let content = fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {}", file.display(), e))?;
    let state: ViewerState = serde_json::from_str(&content)
        .map_err(|e| format!("invalid state in {}: {}", file.display(), e))?;

    let model = LocalModel::shared(state);
    let container = MemoryContainer::new();
    let binding = bind(&model, &container).map_err(|e| e.to_string())?;

    for click in clicks {
        log::debug!(
            "click at ({}, {}) on {}",
            click.client_x,
            click.client_y,
            click.target
        );
        let ran = binding.element().dispatch(ViewerEvent::Click(click));
        log::debug!("click reached {} listener(s)", ran);
    }

    let output = serde_json::json!({
        "markup": container.to_html(),
        "events": model.sent_events(),
    });
    serde_json::to_string_pretty(&output).map_err(|e| e.to_string())
}

fn resources_json() -> String {
    let map: serde_json::Map<String, serde_json::Value> = resources()
        .iter()
        .map(|(name, path)| (name.to_string(), serde_json::Value::from(*path)))
        .collect();
    serde_json::json!({ "js": map }).to_string()
}

fn to_json(state: &ViewerState) -> Result<String, String> {
    serde_json::to_string_pretty(state).map_err(|e| e.to_string())
}

fn parse_key_value(text: &str) -> Result<(String, String), String> {
    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", text))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", text));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_click(text: &str) -> Result<ClickPayload, String> {
    let mut parts = text.split(',');
    let mut coordinate = |name: &str| -> Result<i32, String> {
        parts
            .next()
            .ok_or_else(|| format!("missing {} in '{}'", name, text))?
            .trim()
            .parse()
            .map_err(|e| format!("invalid {} in '{}': {}", name, text, e))
    };
    let client_x = coordinate("x")?;
    let client_y = coordinate("y")?;
    let target = parts
        .next()
        .map(|tag| tag.trim().to_uppercase())
        .unwrap_or_else(|| VIEWER_TAG.to_uppercase());
    Ok(ClickPayload::new(client_x, client_y, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_pairs() {
        assert_eq!(
            parse_key_value("border-radius=20px").unwrap(),
            ("border-radius".to_string(), "20px".to_string())
        );
        assert_eq!(
            parse_key_value("style=a=b").unwrap(),
            ("style".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn clicks_default_to_viewer_tag() {
        assert_eq!(parse_click("10,20").unwrap(), ClickPayload::new(10, 20, "MODEL-VIEWER"));
        assert_eq!(parse_click("1, 2, img").unwrap(), ClickPayload::new(1, 2, "IMG"));
        assert!(parse_click("10").is_err());
        assert!(parse_click("a,b").is_err());
    }

    #[test]
    fn state_inlines_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.glb");
        fs::write(&path, b"glTF").unwrap();

        let state = build_state(
            Some(path.display().to_string()),
            None,
            None,
            true,
            false,
            vec![("width".to_string(), "50%".to_string())],
            vec![],
        )
        .unwrap();

        assert_eq!(state.src.as_deref(), Some("data:model/gltf-binary;base64,Z2xURg=="));
        assert!(state.auto_rotate);
        assert!(!state.camera_controls);
        assert_eq!(state.style.get("width").map(String::as_str), Some("50%"));
    }

    #[test]
    fn state_keeps_urls() {
        let state = build_state(
            Some("https://modelviewer.dev/shared-assets/models/Astronaut.glb".to_string()),
            Some("Astronaut".to_string()),
            None,
            false,
            true,
            vec![],
            vec![],
        )
        .unwrap();
        assert_eq!(
            state.src.as_deref(),
            Some("https://modelviewer.dev/shared-assets/models/Astronaut.glb")
        );
        assert_eq!(state.alt.as_deref(), Some("Astronaut"));
    }

    #[test]
    fn render_reports_markup_and_clicks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"src": "chair.glb", "alt": "Chair"}"#).unwrap();

        let output = render(&path, vec![ClickPayload::new(10, 20, "IMG")]).unwrap();
        let output: serde_json::Value = serde_json::from_str(&output).unwrap();

        let markup = output["markup"].as_str().unwrap();
        assert!(markup.starts_with("<model-viewer alt=\"Chair\" src=\"chair.glb\" camera-controls"));
        assert_eq!(
            output["events"],
            serde_json::json!([
                {"name": "click", "data": {"clientX": 10, "clientY": 20, "target": "IMG"}}
            ])
        );
    }

    #[test]
    fn resources_list_viewer_script() {
        let json: serde_json::Value = serde_json::from_str(&resources_json()).unwrap();
        assert_eq!(json["js"]["model-viewer"], "static/model-viewer.min.js");
    }
}
