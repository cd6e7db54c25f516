//! FTP transport for the publisher.

use crate::config::FtpConfig;
use crate::error::BuildError;
use crate::publish::{RemoteConnector, RemoteSession};
use std::io::Cursor;
use suppaftp::types::FileType;
use suppaftp::FtpStream;
use tracing::debug;

pub struct FtpConnector {
    host: String,
    port: u16,
    username: String,
    password: String,
}

impl FtpConnector {
    pub fn new(config: &FtpConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }
}

impl RemoteConnector for FtpConnector {
    fn connect(&self) -> Result<Box<dyn RemoteSession>, BuildError> {
        let mut stream = FtpStream::connect((self.host.as_str(), self.port)).map_err(|e| {
            BuildError::Connectivity(format!(
                "Cannot reach FTP server {}:{}: {}",
                self.host, self.port, e
            ))
        })?;

        stream
            .login(self.username.as_str(), self.password.as_str())
            .map_err(|e| BuildError::Publish(format!("FTP login failed: {}", e)))?;
        stream
            .transfer_type(FileType::Binary)
            .map_err(|e| BuildError::Publish(format!("Cannot switch to binary mode: {}", e)))?;

        debug!(host = %self.host, port = self.port, "FTP session opened");
        Ok(Box::new(FtpSession { stream }))
    }

    fn describe(&self) -> String {
        format!("ftp://{}:{}", self.host, self.port)
    }
}

struct FtpSession {
    stream: FtpStream,
}

impl RemoteSession for FtpSession {
    fn change_dir(&mut self, path: &str) -> Result<(), BuildError> {
        self.stream
            .cwd(path)
            .map_err(|e| BuildError::Publish(format!("CWD {} failed: {}", path, e)))
    }

    fn make_dir(&mut self, path: &str) -> Result<(), BuildError> {
        self.stream
            .mkdir(path)
            .map_err(|e| BuildError::Publish(format!("MKD {} failed: {}", path, e)))
    }

    fn store(&mut self, filename: &str, content: &[u8]) -> Result<(), BuildError> {
        let mut reader = Cursor::new(content);
        self.stream
            .put_file(filename, &mut reader)
            .map(|_| ())
            .map_err(|e| BuildError::Publish(format!("STOR {} failed: {}", filename, e)))
    }

    fn close(&mut self) -> Result<(), BuildError> {
        self.stream
            .quit()
            .map_err(|e| BuildError::Publish(format!("QUIT failed: {}", e)))
    }
}
