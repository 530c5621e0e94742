mod common;
use common::{minute_series, ramp, ts};

use chrono::{Duration, NaiveDate};
use fvg_engine::{
    annotate_calendar,
    resample::{ResampleOptions, resample},
    sessions::load_sessions_path,
};
use market_data::{Bar, MetaValue};

fn globex() -> fvg_engine::SessionConfig {
    load_sessions_path(concat!(env!("CARGO_MANIFEST_DIR"), "/config/sessions_globex.toml")).unwrap()
}

#[test]
fn shipped_session_file_classifies_the_day() {
    let cfg = globex();
    // 2024-01-02 14:30Z is 09:30 EST
    assert_eq!(cfg.session_for(ts(0)), "RTH");
    assert_eq!(cfg.session_for(ts(-1)), "LONDON");
    // 23:30Z is 18:30 EST
    assert_eq!(cfg.session_for(ts(9 * 60)), "ASIA");
    // 16:00..18:00 EST is the maintenance break
    assert_eq!(cfg.session_for(ts(6 * 60 + 30)), "ETH");
}

#[test]
fn session_file_wins_over_the_series_clock() {
    use chrono_tz::Tz;
    use fvg_engine::sessions::resolve_sessions;

    let path = std::path::Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/config/sessions_globex.toml"));
    let cfg = resolve_sessions(Some(path), Tz::Asia__Tokyo).unwrap();
    assert_eq!(cfg, globex());
    assert_eq!(cfg.tz, Tz::America__New_York);
}

#[test]
fn calendar_columns_survive_resampling() {
    let cpi = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let annotated = annotate_calendar(&ramp(30), &globex(), &[cpi]).unwrap();
    let out = resample(&annotated, "15m".parse().unwrap(), ResampleOptions::default());

    for name in ["session", "weekday", "weekday_name", "is_macro_event_day"] {
        assert_eq!(out.metadata_column(name).map(<[_]>::len), Some(out.len()));
    }
    assert!(
        out.metadata_column("weekday")
            .unwrap()
            .iter()
            .all(|v| *v == MetaValue::Int(1))
    );
    assert!(
        out.metadata_column("is_macro_event_day")
            .unwrap()
            .iter()
            .all(|v| v.as_bool() == Some(true))
    );
}

#[test]
fn macro_day_uses_the_local_date() {
    // 01:00Z on Jan 3 is still Jan 2 in New York
    let bar = Bar::new(ts(0) + Duration::hours(10) + Duration::minutes(30), 1.0, 2.0, 0.5, 1.5, 1.0);
    let series = minute_series(vec![bar]);
    let jan2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let out = annotate_calendar(&series, &globex(), &[jan2]).unwrap();
    assert_eq!(out.metadata_column("is_macro_event_day").unwrap()[0], MetaValue::Bool(true));
    assert_eq!(
        out.metadata_column("weekday_name").unwrap()[0],
        MetaValue::Text("Tuesday".into())
    );
}
