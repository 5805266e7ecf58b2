//! A pool game shared between a local driver and remote connections
//!
//! The session does no I/O itself. Whatever transport owns the sockets
//! reports opens, closes and received bytes, and closes a connection when
//! [`PoolSession::on_recv`] returns an error.

use std::collections::BTreeMap;

use crate::controls::{drain_controls, ControlError, DozerControls};
use crate::level_error::LevelError;
use crate::pool_level::{DozerKey, PoolLevel};
use crate::scene::Camera;

/// Transport-assigned connection id
pub type ConnectionId = u64;

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionInfo {
    pub name: String,
    pub dozer: DozerKey,
}

pub struct PoolSession {
    pristine: PoolLevel,
    pub level: PoolLevel,
    /// The dozer driven from this machine
    pub local: DozerKey,
    connections: BTreeMap<ConnectionId, ConnectionInfo>,
    camera: Camera,
}

impl PoolSession {
    /// Start a session on a copy of `level`, which must contain a camera
    pub fn new(level: PoolLevel) -> Result<Self, LevelError> {
        let camera = level
            .scene
            .cameras
            .first()
            .copied()
            .ok_or_else(|| LevelError::MissingCamera {
                level: level.scene.name.clone(),
            })?;
        let mut live = level.clone();
        let local = live.spawn_dozer("Local");
        Ok(Self {
            pristine: level,
            level: live,
            local,
            connections: BTreeMap::new(),
            camera,
        })
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn connections(&self) -> impl Iterator<Item = (&ConnectionId, &ConnectionInfo)> {
        self.connections.iter()
    }

    /// A new remote player joined: give them a dozer
    pub fn on_open(&mut self, id: ConnectionId) -> DozerKey {
        let name = format!("[{}]", id);
        let dozer = self.level.spawn_dozer(&name);
        log::info!("Player {} joined", name);
        self.connections.insert(id, ConnectionInfo { name, dozer });
        dozer
    }

    /// A remote player left: remove their dozer
    pub fn on_close(&mut self, id: ConnectionId) {
        if let Some(info) = self.connections.remove(&id) {
            self.level.remove_dozer(info.dozer);
            log::info!("Player {} left", info.name);
        }
    }

    /// Consume every complete message in a connection's receive buffer
    ///
    /// On a malformed message the player is removed and the error returned
    /// so the caller can close the socket.
    pub fn on_recv(&mut self, id: ConnectionId, buffer: &mut Vec<u8>) -> Result<(), ControlError> {
        if !self.connections.contains_key(&id) {
            log::warn!("Data from unknown connection {}, treating it as new", id);
            self.on_open(id);
        }

        match drain_controls(buffer) {
            Ok(Some(controls)) => {
                let dozer = self.connections.get(&id).map(|info| info.dozer);
                if let Some(dozer) = dozer.and_then(|key| self.level.dozer_mut(key)) {
                    dozer.controls = controls;
                }
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                log::warn!("Dropping connection {}: {}", id, e);
                self.on_close(id);
                Err(e)
            }
        }
    }

    pub fn set_local_controls(&mut self, controls: DozerControls) {
        if let Some(dozer) = self.level.dozer_mut(self.local) {
            dozer.controls = controls;
        }
    }

    pub fn update(&mut self, elapsed: f32) {
        self.level.update(elapsed);
    }

    /// Reset the table, giving every connected player and the local driver a fresh dozer
    pub fn restart(&mut self) {
        self.level = self.pristine.clone();
        for info in self.connections.values_mut() {
            info.dozer = self.level.spawn_dozer(&info.name);
        }
        self.local = self.level.spawn_dozer("Local");
    }
}
