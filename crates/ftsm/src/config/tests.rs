use super::*;

#[test]
fn config() {
    let got = Config::load("testfiles/test.toml").unwrap();
    let want = Config {
        surface: String::from("valley.dat"),
        start: [-1.0, 0.0],
        end: [1.0, 0.0],
        temperature_parameter: 4.5,
        point_count: 30,
        max_iterations: 250,
        step_size: 0.005,
        strict: true,
        output: String::from("string.txt"),
    };
    assert_eq!(got, want);
}

#[test]
fn short_names() {
    let got = Config::load("testfiles/legacy.toml").unwrap();
    let want = Config::new("valley.dat", [-1.0, 0.0], [1.0, 0.0])
        .point_count(20)
        .max_iterations(40);
    assert_eq!(got, want);
    assert_eq!(got.temperature_parameter, 9.0);
}

#[test]
fn defaults() {
    let got = Config::load("testfiles/minimal.toml").unwrap();
    let want = Config::new("pes.txt", [0.5, -0.25], [1.5, 2.0]);
    assert_eq!(got, want);
    assert_eq!(got.params(), Params::default());
    assert_eq!(got.output, "final_string_coordinates.txt");
    assert_eq!(got.start(), Point::new(0.5, -0.25));
    assert_eq!(got.end(), Point::new(1.5, 2.0));
}

#[test]
fn unknown_field() {
    let got = Config::load("testfiles/unknown.toml");
    assert!(matches!(got, Err(ConfigError::Toml(_))), "{got:?}");
}

#[test]
fn too_few_points() {
    let got = Config::load("testfiles/bad_count.toml");
    assert!(matches!(got, Err(ConfigError::Invalid(_))), "{got:?}");
}

#[test]
fn missing_file() {
    let got = Config::load("testfiles/nonexistent.toml");
    assert!(
        matches!(got, Err(ConfigError::Io(_, std::io::ErrorKind::NotFound))),
        "{got:?}"
    );
}

#[test]
fn validate() {
    let c = Config::new("pes.txt", [0.0, 0.0], [1.0, 1.0]);
    assert!(c.validate().is_ok());
    assert!(c.clone().step_size(0.0).validate().is_err());
    assert!(c.clone().step_size(f64::NAN).validate().is_err());
    assert!(c.clone().point_count(1).validate().is_err());
    assert!(c.clone().point_count(2).validate().is_ok());

    let same = Config::new("pes.txt", [1.0, 1.0], [1.0, 1.0]);
    assert!(matches!(same.validate(), Err(ConfigError::Invalid(_))));
    let inf = Config::new("pes.txt", [f64::INFINITY, 0.0], [1.0, 1.0]);
    assert!(inf.validate().is_err());
}

#[test]
fn display() {
    let got = Config::load("testfiles/test.toml").unwrap().to_string();
    let want = "
Configuration Options:
surface = valley.dat
start = [-1.0, 0.0]
end = [1.0, 0.0]
temperature_parameter = 4.5 (reserved)
point_count = 30
max_iterations = 250
step_size = 0.005
strict = true
output = string.txt
";
    assert_eq!(got, want);
}
