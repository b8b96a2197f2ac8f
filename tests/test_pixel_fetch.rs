use eepatch::{FileFormat, ImageExpr, Patch, PixelService};
use serde_json::json;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

fn test_patch() -> Patch {
    Patch {
        image: ImageExpr::image("LANDSAT/LC08/C02/T1_L2/LC08_001002_20200101"),
        file_format: FileFormat::Npy,
        width: 100.0,
        height: 100.0,
        scale_x: 10.0,
        scale_y: -10.0,
        translate_x: 0.0,
        translate_y: 0.0,
        crs: "EPSG:4326".to_string(),
        name: "loopback_patch".to_string(),
        id: json!({ "row": 3, "col": 7 }),
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Minimal single-request HTTP server on a loopback port. Reads the full
/// request (headers plus Content-Length body), replies with the given status
/// line and body, then closes. Returns the base URL.
fn spawn_pixel_server(status_line: &'static str, body: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind loopback listener");
    let addr = listener.local_addr().expect("Failed to read local address");

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("Failed to accept connection");

        let mut request = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).expect("Failed to read request");
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);

            if let Some(header_end) = find_subslice(&request, b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&request[..header_end]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() - (header_end + 4) >= content_length {
                    break;
                }
            }
        }

        let response = format!(
            "{}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status_line,
            body.len()
        );
        stream
            .write_all(response.as_bytes())
            .and_then(|_| stream.write_all(body))
            .expect("Failed to write response");
    });

    format!("http://{}", addr)
}

#[test]
fn test_fetch_returns_bytes_with_name_and_id() {
    const PIXELS: &[u8] = b"\x93NUMPY fake payload bytes";
    let base_url = spawn_pixel_server("HTTP/1.1 200 OK", PIXELS);

    let service = PixelService::new(base_url, "test-token").expect("Failed to build service");
    let patch = test_patch();
    let result = service.fetch_pixels(&patch).expect("Fetch failed");

    assert_eq!(result.pixels, PIXELS);
    assert_eq!(result.name, patch.name);
    assert_eq!(result.id, patch.id);
}

#[test]
fn test_fetch_passes_id_through_even_when_null() {
    const PIXELS: &[u8] = b"bytes";
    let base_url = spawn_pixel_server("HTTP/1.1 200 OK", PIXELS);

    let service = PixelService::new(base_url, "test-token").expect("Failed to build service");
    let mut patch = test_patch();
    patch.name = String::new();
    patch.id = json!(null);

    let result = service.fetch_pixels(&patch).expect("Fetch failed");
    assert_eq!(result.name, "");
    assert!(result.id.is_null());
}

#[test]
fn test_fetched_bytes_written_under_patch_name() {
    const PIXELS: &[u8] = b"\x93NUMPY payload destined for disk";
    let base_url = spawn_pixel_server("HTTP/1.1 200 OK", PIXELS);

    let service = PixelService::new(base_url, "test-token").expect("Failed to build service");
    let result = service.fetch_pixels(&test_patch()).expect("Fetch failed");

    // name/id exist so a downstream writer can name the output file; do what
    // such a writer does and check the bytes survive the round trip
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let file_name = format!("{}_{}_{}.npy", result.name, result.id["row"], result.id["col"]);
    let path = dir.path().join(file_name);
    std::fs::write(&path, &result.pixels).expect("Failed to write pixels");

    assert_eq!(std::fs::read(&path).expect("Failed to read pixels back"), PIXELS);
}

#[test]
fn test_service_error_is_surfaced_not_swallowed() {
    let base_url = spawn_pixel_server(
        "HTTP/1.1 429 Too Many Requests",
        b"{\"error\": \"quota exceeded\"}",
    );

    let service = PixelService::new(base_url, "test-token").expect("Failed to build service");
    let err = service.fetch_pixels(&test_patch()).unwrap_err();

    match err {
        eepatch::EeError::Service { status, message } => {
            assert_eq!(status, 429);
            assert!(message.contains("quota exceeded"));
        }
        other => panic!("Expected service error, got: {}", other),
    }
}

#[test]
fn test_invalid_patch_never_reaches_the_wire() {
    // No server at all; validation must fail before any connection attempt
    let service =
        PixelService::new("http://127.0.0.1:1", "test-token").expect("Failed to build service");
    let mut patch = test_patch();
    patch.scale_x = 0.0;

    let err = service.fetch_pixels(&patch).unwrap_err();
    assert!(matches!(err, eepatch::EeError::InvalidPatch(_)));
}

/// Live round trip against a real endpoint. Skips unless the environment
/// provides EEPATCH_ENDPOINT and EEPATCH_TOKEN.
#[test]
fn test_fetch_pixels_live_endpoint() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (endpoint, token) = match (
        std::env::var("EEPATCH_ENDPOINT"),
        std::env::var("EEPATCH_TOKEN"),
    ) {
        (Ok(endpoint), Ok(token)) => (endpoint, token),
        _ => {
            println!("EEPATCH_ENDPOINT / EEPATCH_TOKEN not set, skipping live fetch test");
            return;
        }
    };

    let service = PixelService::new(endpoint, token).expect("Failed to build service");
    match service.fetch_pixels(&test_patch()) {
        Ok(result) => {
            println!(
                "Fetched {} bytes for patch '{}'",
                result.pixels.len(),
                result.name
            );
            assert!(!result.pixels.is_empty());
        }
        Err(e) => {
            println!("Live fetch failed: {}", e);
            println!("This is expected if the endpoint is unreachable or the token expired");
        }
    }
}
