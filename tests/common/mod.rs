use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::JoinHandle;
use std::time::Duration;

/// Scripted response: any request whose path contains `path_contains` gets
/// `status` + `body` back.
pub struct Route {
  pub path_contains: String,
  pub status: u16,
  pub body: String,
}

impl Route {
  #[allow(dead_code)]
  pub fn json(path_contains: &str, body: serde_json::Value) -> Self {
    Self {
      path_contains: path_contains.to_string(),
      status: 200,
      body: body.to_string(),
    }
  }

  #[allow(dead_code)]
  pub fn status(path_contains: &str, status: u16, body: &str) -> Self {
    Self {
      path_contains: path_contains.to_string(),
      status,
      body: body.to_string(),
    }
  }
}

/// One request as the fixture server saw it.
#[derive(Debug)]
pub struct SeenRequest {
  pub method: String,
  pub path: String,
  pub body: String,
  pub authorization: Option<String>,
}

/// Single-threaded loopback HTTP fixture. Serves scripted routes one
/// connection at a time until `finish` sends the shutdown request, then
/// yields everything it saw.
pub struct TestServer {
  addr: std::net::SocketAddr,
  join: Option<JoinHandle<Vec<SeenRequest>>>,
}

#[allow(dead_code)]
pub fn start_server(routes: Vec<Route>) -> TestServer {
  let listener = TcpListener::bind("127.0.0.1:0").unwrap();
  let addr = listener.local_addr().unwrap();

  let join = std::thread::spawn(move || {
    let mut seen: Vec<SeenRequest> = Vec::new();

    loop {
      let Ok((mut stream, _)) = listener.accept() else { break };
      let Some(req) = read_request(&mut stream) else { continue };

      if req.path.starts_with("/__shutdown") {
        write_response(&mut stream, 200, "{}");
        break;
      }

      let (status, body) = routes
        .iter()
        .find(|r| req.path.contains(&r.path_contains))
        .map(|r| (r.status, r.body.clone()))
        .unwrap_or((404, r#"{"message":"no fixture route"}"#.to_string()));

      write_response(&mut stream, status, &body);
      seen.push(req);
    }

    seen
  });

  TestServer { addr, join: Some(join) }
}

impl TestServer {
  pub fn base(&self) -> String {
    format!("http://{}", self.addr)
  }

  /// Stop the server and return the recorded requests (shutdown excluded).
  pub fn finish(mut self) -> Vec<SeenRequest> {
    if let Ok(mut stream) = TcpStream::connect(self.addr) {
      let _ = stream.write_all(b"GET /__shutdown HTTP/1.1\r\nHost: fixture\r\nConnection: close\r\n\r\n");
      let mut sink = Vec::new();
      let _ = stream.read_to_end(&mut sink);
    }

    self.join.take().unwrap().join().unwrap()
  }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  haystack.windows(needle.len()).position(|w| w == needle)
}

fn read_request(stream: &mut TcpStream) -> Option<SeenRequest> {
  stream.set_read_timeout(Some(Duration::from_secs(5))).ok();
  stream.set_write_timeout(Some(Duration::from_secs(5))).ok();

  let mut buf: Vec<u8> = Vec::new();
  let mut tmp = [0u8; 4096];

  let header_end = loop {
    if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
      break pos + 4;
    }

    match stream.read(&mut tmp) {
      Ok(0) | Err(_) => return None,
      Ok(n) => buf.extend_from_slice(&tmp[..n]),
    }
  };

  let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
  let request_line = head.lines().next()?;
  let mut parts = request_line.split_whitespace();
  let method = parts.next()?.to_string();
  let path = parts.next()?.to_string();

  let header_value = |name: &str| -> Option<String> {
    head.lines().skip(1).find_map(|line| {
      let (key, value) = line.split_once(':')?;
      key.trim().eq_ignore_ascii_case(name).then(|| value.trim().to_string())
    })
  };

  let content_length = header_value("content-length")
    .and_then(|v| v.parse::<usize>().ok())
    .unwrap_or(0);

  let mut body = buf[header_end..].to_vec();

  while body.len() < content_length {
    match stream.read(&mut tmp) {
      Ok(0) | Err(_) => break,
      Ok(n) => body.extend_from_slice(&tmp[..n]),
    }
  }
  body.truncate(content_length);

  Some(SeenRequest {
    method,
    path,
    body: String::from_utf8_lossy(&body).to_string(),
    authorization: header_value("authorization"),
  })
}

fn write_response(stream: &mut TcpStream, status: u16, body: &str) {
  let reason = match status {
    200 => "OK",
    403 => "Forbidden",
    404 => "Not Found",
    500 => "Internal Server Error",
    _ => "OK",
  };

  let resp = format!(
    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
    status,
    reason,
    body.len(),
    body
  );

  let _ = stream.write_all(resp.as_bytes());
}

/// A one-entry `/contributors` page.
#[allow(dead_code)]
pub fn contributors_page(entries: &[(&str, u64)]) -> serde_json::Value {
  serde_json::Value::Array(
    entries
      .iter()
      .map(|(login, n)| {
        serde_json::json!({
          "login": login,
          "id": 1,
          "type": "User",
          "contributions": n
        })
      })
      .collect(),
  )
}

/// A one-commit `/commits?author=` page carrying `commit.author.email`.
#[allow(dead_code)]
pub fn commits_page(login: &str, email: &str) -> serde_json::Value {
  serde_json::json!([
    {
      "sha": "7ac0fe9a24de23dc5fb828f42f045ffd902e578e",
      "author": { "login": login },
      "commit": {
        "author": { "name": login, "email": email, "date": "2024-01-01T00:00:00Z" },
        "message": "fix: something"
      }
    }
  ])
}

/// Binary under test with a hermetic environment for the vars it reads.
#[allow(dead_code)]
pub fn cmd() -> assert_cmd::Command {
  let mut cmd = assert_cmd::Command::cargo_bin("contributor-badges").unwrap();

  for name in [
    "GITHUB_CLIENT_ID",
    "GITHUB_CLIENT_SECRET",
    "GITHUB_REPOS_CACHE_AGE",
    "GITHUB_EMAIL_CACHE_AGE",
    "BADGES_VALET_USERNAME",
    "BADGES_VALET_PASSWORD",
  ] {
    cmd.env_remove(name);
  }

  cmd
}
