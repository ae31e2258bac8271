use georef_core::{ImageInfo, ImagePt, RealPt};
use georef_linear::AffineError;
use georef_pipeline::{GeorefConfig, GeorefSession, ImportColumns};
use std::fs;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

const SURVEY: &str = "\
coulmn[pixel],row[pixel],Longitude [DD],Latitude [DD]
10,10,0,0
110,10,100,0
10,110,0,100
55,abc,50,50
";

#[test]
fn end_to_end_calibration_from_csv_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SURVEY.as_bytes()).unwrap();

    let mut session = GeorefSession::new();
    session.set_image(ImageInfo::new(200, 200));
    let report = session
        .import_csv(fs::File::open(file.path()).unwrap())
        .unwrap();
    assert_eq!(report.rows, 4);
    assert_eq!(report.loaded, 3);
    assert_eq!(session.points().len(), 3);

    let real = session.estimate_real(ImagePt::new(60.0, 60.0)).unwrap();
    assert!((real.x - 50.0).abs() < 1e-6);
    assert!((real.y - 50.0).abs() < 1e-6);
    let image = session.estimate_image(RealPt::new(50.0, 50.0)).unwrap();
    assert!((image.x - 60.0).abs() < 1e-6);
    assert!((image.y - 60.0).abs() < 1e-6);
}

#[test]
fn calibration_becomes_available_at_third_point() {
    let mut session = GeorefSession::new();
    let pairs = [
        (ImagePt::new(0.0, 0.0), RealPt::new(10.0, 20.0)),
        (ImagePt::new(100.0, 0.0), RealPt::new(11.0, 20.0)),
        (ImagePt::new(0.0, 100.0), RealPt::new(10.0, 19.0)),
    ];
    for (n, (image, real)) in pairs.into_iter().enumerate() {
        assert_eq!(
            session.transform().unwrap_err(),
            AffineError::Unavailable { have: n }
        );
        session.add_point(image, real).unwrap();
    }
    let t = session.transform().unwrap();
    let r = t.image_to_real(ImagePt::new(50.0, 50.0));
    assert!((r.x - 10.5).abs() < 1e-9);
    assert!((r.y - 19.5).abs() < 1e-9);
}

#[test]
fn deleting_a_defining_point_promotes_the_fourth() {
    let mut session = GeorefSession::new();
    let first = session
        .add_point(ImagePt::new(0.0, 0.0), RealPt::new(999.0, 999.0))
        .unwrap();
    session
        .add_point(ImagePt::new(100.0, 0.0), RealPt::new(100.0, 0.0))
        .unwrap();
    session
        .add_point(ImagePt::new(0.0, 100.0), RealPt::new(0.0, 100.0))
        .unwrap();
    session
        .add_point(ImagePt::new(100.0, 100.0), RealPt::new(100.0, 100.0))
        .unwrap();

    let residuals = session.residuals().unwrap();
    assert!(residuals[3].real_error > 1.0);

    session.delete_point(first).unwrap();
    let real = session.estimate_real(ImagePt::new(50.0, 50.0)).unwrap();
    assert!((real.x - 50.0).abs() < 1e-9);
    assert!((real.y - 50.0).abs() < 1e-9);
}

#[test]
fn session_file_round_trip_with_custom_config() {
    let config = GeorefConfig {
        import: ImportColumns {
            image_x: "col".into(),
            image_y: "row".into(),
            real_x: "easting".into(),
            real_y: "northing".into(),
        },
        ..GeorefConfig::default()
    };
    let mut session = GeorefSession::with_config(config.clone()).unwrap();
    session
        .import_csv("col,row,easting,northing\n0,0,500000,4000000\n1000,0,500100,4000000\n0,1000,500000,3999900\n".as_bytes())
        .unwrap();

    let file = NamedTempFile::new().unwrap();
    fs::write(file.path(), session.to_json().unwrap()).unwrap();
    let restored = GeorefSession::from_json(&fs::read_to_string(file.path()).unwrap()).unwrap();

    assert_eq!(restored.config(), &config);
    let r = restored.estimate_real(ImagePt::new(500.0, 500.0)).unwrap();
    assert!((r.x - 500_050.0).abs() < 1e-6);
    assert!((r.y - 3_999_950.0).abs() < 1e-6);
}

struct WarningCapture(Mutex<Vec<String>>);

impl log::Log for WarningCapture {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::Level::Warn
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            self.0.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static WARNINGS: WarningCapture = WarningCapture(Mutex::new(Vec::new()));

#[test]
fn importing_points_outside_the_image_warns() {
    let _ = log::set_logger(&WARNINGS);
    log::set_max_level(log::LevelFilter::Warn);

    let mut session = GeorefSession::new();
    session.set_image(ImageInfo::new(100, 100));
    let doc = "coulmn[pixel],row[pixel],Longitude [DD],Latitude [DD]\n5000,5000,0,0\n";
    session.import_csv(doc.as_bytes()).unwrap();

    let warnings = WARNINGS.0.lock().unwrap();
    assert!(
        warnings
            .iter()
            .any(|w| w.contains("image(5000, 5000)") && w.contains("100x100")),
        "warnings: {warnings:?}"
    );
}
