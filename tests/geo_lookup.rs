mod common;

use common::{MockDelay, MockNetwork, Reply};
use libatmoscan::config::{Config, MAX_ACCESS_POINTS};
use libatmoscan::geo::{AccessPoint, GeoFix, HttpLookup, LookupService, SessionError, WifiScan};
use libatmoscan::network::error::Error;

struct FixedScan(Vec<AccessPoint>);

impl WifiScan for FixedScan {
    fn scan(&mut self, out: &mut heapless::Vec<AccessPoint, MAX_ACCESS_POINTS>) {
        out.clear();
        for ap in self.0.iter().take(MAX_ACCESS_POINTS) {
            let _ = out.push(*ap);
        }
    }
}

fn lookup(replies: impl IntoIterator<Item = Reply>, scan: Vec<AccessPoint>) -> HttpLookup<MockNetwork, MockDelay, FixedScan> {
    let config = Config::from_json(r#"{"timezone_key":"TZKEY","place_user":"atmoscan"}"#).unwrap();
    HttpLookup::new(MockNetwork::with_replies(replies), MockDelay::default(), FixedScan(scan), config)
}

fn one_ap() -> Vec<AccessPoint> {
    vec![AccessPoint { bssid: [0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e], rssi: -70 }]
}

#[test]
fn test_fix_session() {
    let mut service = lookup(
        [Reply::ok_json(r#"{"result":200,"data":{"lat":47.4376,"lon":8.5688,"range":150,"time":1514761200}}"#)],
        one_ap(),
    );

    assert_eq!(service.fix(), Ok(GeoFix::new(47.4376, 8.5688)));

    let network = service.network_mut();
    assert_eq!(network.hosts, ["api.mylnikov.org:80"]);
    // base64 of "00:1A:2B:3C:4D:5E,-70"
    assert_eq!(
        network.request_path(0),
        "/geolocation/wifi?v=1.2&search=MDA6MUE6MkI6M0M6NEQ6NUUsLTcw"
    );
}

#[test]
fn test_fix_without_access_points() {
    let mut service = lookup([], Vec::new());
    assert_eq!(service.fix(), Err(SessionError::NoAccessPoints));
    assert!(service.network_mut().hosts.is_empty());
}

#[test]
fn test_fix_not_found() {
    let mut service = lookup([Reply::ok_json(r#"{"result":404,"data":{}}"#)], one_ap());
    assert_eq!(service.fix(), Err(SessionError::Incomplete));
}

#[test]
fn test_timezone_session() {
    let mut service = lookup(
        [Reply::ok_json(
            r#"{"status":"OK","message":"","countryCode":"CH","countryName":"Switzerland",
               "zoneName":"Europe/Zurich","abbreviation":"CET","gmtOffset":3600,"dst":"0",
               "zoneStart":1509238800,"zoneEnd":1521939600,"nextAbbreviation":"CEST",
               "timestamp":1514764800,"formatted":"2018-01-01 00:00:00"}"#,
        )],
        one_ap(),
    );

    let info = service.timezone(&GeoFix::new(47.437691, 8.568854)).unwrap();
    assert_eq!(info.utc_offset, 3600);
    assert!(!info.dst);
    assert_eq!(info.standard_offset_seconds(), 3600);
    assert_eq!(info.zone_name.as_str(), "Europe/Zurich");

    let network = service.network_mut();
    assert_eq!(network.hosts, ["api.timezonedb.com:80"]);
    assert_eq!(
        network.request_path(0),
        "/v2/get-time-zone?format=json&by=position&lat=47.437691&lng=8.568854&key=TZKEY"
    );
}

#[test]
fn test_timezone_failure_status() {
    let mut service = lookup(
        [Reply::ok_json(r#"{"status":"FAILED","message":"Invalid API key.","gmtOffset":0}"#)],
        one_ap(),
    );
    assert_eq!(service.timezone(&GeoFix::new(1.0, 1.0)), Err(SessionError::Incomplete));
}

#[test]
fn test_place_session() {
    let mut service = lookup(
        [Reply::ok_json(
            r#"{"geonames":[{"adminCode1":"ZH","lng":"8.58356","distance":"1.17","geonameId":2660728,
               "toponymName":"Kloten","countryId":"2658434","fcl":"P","population":16935,
               "countryCode":"CH","name":"Kloten","fclName":"city, village,...",
               "countryName":"Switzerland","fcodeName":"seat of a third-order administrative division",
               "adminName1":"Zurich","lat":"47.45152","fcode":"PPLA3"}]}"#,
        )],
        one_ap(),
    );

    let place = service.place(&GeoFix::new(47.437691, 8.568854)).unwrap();
    assert_eq!(place.locality.as_str(), "Kloten");
    assert_eq!(place.country.as_str(), "Switzerland");
    assert_eq!(place.country_code.as_str(), "CH");
    assert_eq!(
        service.network_mut().request_path(0),
        "/findNearbyPlaceNameJSON?lat=47.43769100&lng=8.56885400&username=atmoscan"
    );
}

#[test]
fn test_place_without_fields_is_a_failure() {
    let mut service = lookup(
        [Reply::ok_json(r#"{"geonames":[{"lat":"47.45152","population":16935}]}"#)],
        one_ap(),
    );
    assert_eq!(service.place(&GeoFix::new(47.4, 8.5)), Err(SessionError::Incomplete));
}

#[test]
fn test_transport_errors_are_reported() {
    let mut service = lookup([Reply::raw("HTTP/1.1 500 Internal Server Error\r\n\r\n")], one_ap());
    assert_eq!(
        service.place(&GeoFix::new(47.4, 8.5)),
        Err(SessionError::Transport(Error::UnexpectedStatus))
    );
}

#[test]
fn test_link_status_comes_from_network() {
    let mut service = lookup([], one_ap());
    assert!(service.is_connected());
    service.network_mut().disconnected = true;
    assert!(!service.is_connected());
}
