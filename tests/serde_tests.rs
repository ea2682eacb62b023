use mini_ini::{
    from_document, from_path, from_str, serialize_into, to_document, to_string, Document, Error,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy)]
enum Level {
    Debug,
    Info,
    Warn,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Logging {
    level: Level,
    file: Option<String>,
    rotate: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Server {
    host: String,
    port: u16,
    ratio: f64,
    marker: char,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct AppConfig {
    server: Server,
    logging: Logging,
    extra: Option<BTreeMap<String, String>>,
}

fn config() -> AppConfig {
    AppConfig {
        server: Server {
            host: "0.0.0.0".to_string(),
            port: 8080,
            ratio: 0.75,
            marker: '#',
        },
        logging: Logging {
            level: Level::Warn,
            file: None,
            rotate: true,
        },
        extra: None,
    }
}

#[test]
fn test_struct_round_trip() {
    let config = config();
    let text = to_string(&config).unwrap();
    assert_eq!(
        text,
        "[server]\nhost=0.0.0.0\nport=8080\nratio=0.75\nmarker=#\n\
         [logging]\nlevel=Warn\nrotate=true\n"
    );

    let back: AppConfig = from_str(&text).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_optional_section_and_values() {
    let text = "[server]\nhost=h\nport=1\nratio=1\nmarker=x\n\
                [logging]\nlevel=Info\nfile=\nrotate=FALSE\n\
                [extra]\ncolor=blue\n";
    let config: AppConfig = from_str(text).unwrap();
    assert_eq!(config.logging.level, Level::Info);
    assert_eq!(config.logging.file, None);
    assert!(!config.logging.rotate);

    let extra = config.extra.unwrap();
    assert_eq!(extra.get("color").map(String::as_str), Some("blue"));
}

#[test]
fn test_conversion_error_location() {
    let text = "[server]\nhost=h\nport=99999\nratio=1\nmarker=x\n\
                [logging]\nlevel=Info\nrotate=true\n";
    match from_str::<AppConfig>(text).unwrap_err() {
        Error::Conversion {
            section, key, value, ..
        } => {
            assert_eq!(section, "server");
            assert_eq!(key, "port");
            assert_eq!(value, "99999");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_serialize_into_preserves_layout() {
    let mut document: Document = "; managed by ops\n\n[logging]\n; verbosity\nlevel=Debug\n"
        .parse()
        .unwrap();
    serialize_into(&mut document, &config()).unwrap();

    assert_eq!(
        document.to_string(),
        "; managed by ops\n\n[logging]\n; verbosity\nlevel=Warn\nrotate=true\n\
         [server]\nhost=0.0.0.0\nport=8080\nratio=0.75\nmarker=#\n"
    );
}

#[test]
fn test_map_of_maps() {
    let mut colors = BTreeMap::new();
    colors.insert("fg".to_string(), "white".to_string());
    colors.insert("bg".to_string(), "black".to_string());
    let mut theme = BTreeMap::new();
    theme.insert("Theme".to_string(), colors);

    let document = to_document(&theme).unwrap();
    assert_eq!(document.to_string(), "[Theme]\nbg=black\nfg=white\n");

    let back: BTreeMap<String, BTreeMap<String, String>> = from_document(&document).unwrap();
    assert_eq!(back, theme);
}

#[test]
fn test_sequences_are_unsupported() {
    #[derive(Serialize)]
    struct Tags {
        tags: Vec<String>,
    }
    #[derive(Serialize)]
    struct Root {
        section: Tags,
    }

    let root = Root {
        section: Tags {
            tags: vec!["a".into()],
        },
    };
    assert!(matches!(to_string(&root), Err(Error::UnsupportedType(_))));
}

#[test]
fn test_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.ini");
    to_document(&config()).unwrap().save_as(&path).unwrap();

    let loaded: AppConfig = from_path(&path).unwrap();
    assert_eq!(loaded, config());
}
