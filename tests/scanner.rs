use libatmoscan::json::{Handler, MAX_DEPTH, Path, RawValue, ScanError, Scanner};
use rand::Rng;

#[derive(Default, Debug, PartialEq)]
struct Events(Vec<String>);

impl Handler for Events {
    fn document_start(&mut self) {
        self.0.push("start".into());
    }
    fn object_start(&mut self, path: &Path<'_>) {
        self.0.push(format!("{{ {} {}", path.key, path.depth));
    }
    fn object_end(&mut self, path: &Path<'_>) {
        self.0.push(format!("}} {}", path.key));
    }
    fn array_start(&mut self, path: &Path<'_>) {
        self.0.push(format!("[ {}", path.key));
    }
    fn array_end(&mut self, path: &Path<'_>) {
        self.0.push(format!("] {}", path.key));
    }
    fn key_value(&mut self, path: &Path<'_>, value: RawValue<'_>) {
        self.0
            .push(format!("{}.{}={:?}:{}", path.parent, path.key, value.kind(), value.as_str()));
    }
    fn document_end(&mut self) {
        self.0.push("end".into());
    }
}

const FEED: &str = r#"HTTP junk before the body
{"src":1,"acList":[{"Id":4195,"Call":"SWR123","From":"LSZH Zürich, Switzerland",
"Cos":[47.1,8.5,1514761200000,5000,47.2,8.6,1514761260000,5200],"PosStale":false,
"Mdl":"Airbus A319 \"Neo\"","Trt":2},{"Id":7,"Alt":-20,"Sqk":null}],"totalAc":2,
"flgH":20,"stm":1514761260000}"#;

fn scan_in_chunks(input: &[u8], cuts: &[usize]) -> Events {
    let mut scanner: Scanner = Scanner::new();
    let mut events = Events::default();
    let mut start = 0;
    for &cut in cuts.iter().chain(std::iter::once(&input.len())) {
        scanner.feed_slice(&input[start..cut], &mut events).unwrap();
        start = cut;
    }
    scanner.finish(&mut events).unwrap();
    events
}

#[test]
fn test_chunk_boundaries_do_not_change_events() {
    let input = FEED.as_bytes();
    let reference = scan_in_chunks(input, &[]);
    for expected in [
        "acList.Call=String:SWR123",
        "acList.From=String:LSZH Z?rich, Switzerland",
        "acList.Mdl=String:Airbus A319 \"Neo\"",
        "acList.Cos=Number:5200",
        "acList.Sqk=Null:null",
        ".stm=Number:1514761260000",
    ] {
        assert!(reference.0.iter().any(|event| event == expected), "missing {expected}");
    }

    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let mut cuts: Vec<usize> = (0..rng.gen_range(1..12)).map(|_| rng.gen_range(0..=input.len())).collect();
        cuts.sort_unstable();
        assert_eq!(scan_in_chunks(input, &cuts), reference);
    }
}

#[test]
fn test_depth_limit() {
    let mut nested = "[".repeat(MAX_DEPTH);
    nested.push_str(&"]".repeat(MAX_DEPTH));
    let mut scanner: Scanner = Scanner::new();
    assert_eq!(scanner.feed_slice(nested.as_bytes(), &mut Events::default()), Ok(()));
    assert!(scanner.is_finished());

    let too_deep = "[".repeat(MAX_DEPTH + 1);
    let mut scanner: Scanner = Scanner::new();
    let mut events = Events::default();
    assert_eq!(
        scanner.feed_slice(too_deep.as_bytes(), &mut events),
        Err(ScanError::TooDeep)
    );
    assert_eq!(scanner.finish(&mut events), Err(ScanError::TooDeep));
    assert_eq!(events.0.last().map(String::as_str), Some("end"));
}

#[test]
fn test_trailing_bytes_after_document_are_ignored() {
    let mut scanner: Scanner = Scanner::new();
    let mut events = Events::default();
    scanner.feed_slice(br#"{"a":true}  {"b":false}"#, &mut events).unwrap();
    assert_eq!(scanner.finish(&mut events), Ok(()));
    assert_eq!(events.0, ["start", "{  1", ".a=Bool:true", "} ", "end"]);
}

#[test]
fn test_empty_stream() {
    let mut scanner: Scanner = Scanner::new();
    let mut events = Events::default();
    scanner.feed_slice(b"\r\n  ", &mut events).unwrap();
    assert_eq!(scanner.finish(&mut events), Err(ScanError::Empty));
    assert!(events.0.is_empty());
}
