/// Compiled shader program with hot-reloadable reflection.
///
/// Materials subscribe to reload notifications; the shader keeps the
/// callbacks in a slot map so each subscriber can unsubscribe with the key
/// it was given.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use slotmap::{new_key_type, SlotMap};
use crate::device::{GraphicsDevice, ProgramHandle};
use crate::error::Result;
use crate::shader::shader_reflection::ShaderReflection;
use crate::{engine_info, engine_trace};

const SOURCE: &str = "galaxy3d::Shader";

new_key_type! {
    /// Subscription returned by `Shader::add_reload_callback`
    pub struct ReloadCallbackKey;
}

/// Invoked with the new reflection; must not touch the shader's callback registry
pub type ReloadCallback = Box<dyn Fn(&ShaderReflection) + Send + Sync>;

pub struct Shader {
    device: Arc<dyn GraphicsDevice>,
    name: String,
    program: ProgramHandle,
    reflection: RwLock<Arc<ShaderReflection>>,
    callbacks: Mutex<SlotMap<ReloadCallbackKey, ReloadCallback>>,
    generation: AtomicU64,
}

impl Shader {
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        name: impl Into<String>,
        program: ProgramHandle,
        reflection: ShaderReflection,
    ) -> Self {
        Self {
            device,
            name: name.into(),
            program,
            reflection: RwLock::new(Arc::new(reflection)),
            callbacks: Mutex::new(SlotMap::with_key()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn device(&self) -> &Arc<dyn GraphicsDevice> {
        &self.device
    }

    /// Current reflection snapshot
    pub fn reflection(&self) -> Arc<ShaderReflection> {
        self.reflection
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of reloads so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Replace the reflection and notify every subscriber
    pub fn reload(&self, reflection: ShaderReflection) {
        let reflection = Arc::new(reflection);
        *self
            .reflection
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = reflection.clone();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        let callbacks = self.callbacks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for callback in callbacks.values() {
            callback(&reflection);
        }
        engine_info!(
            SOURCE,
            "Shader '{}' reloaded (generation {}, {} subscribers)",
            self.name,
            generation,
            callbacks.len()
        );
    }

    pub fn add_reload_callback<F>(&self, callback: F) -> ReloadCallbackKey
    where
        F: Fn(&ShaderReflection) + Send + Sync + 'static,
    {
        self.callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(Box::new(callback))
    }

    /// Returns false when the key was already removed
    pub fn remove_reload_callback(&self, key: ReloadCallbackKey) -> bool {
        self.callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(key)
            .is_some()
    }

    pub fn reload_callback_count(&self) -> usize {
        self.callbacks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Bind the program for the next draw
    pub fn bind(&self) -> Result<()> {
        self.device.bind_program(self.program)?;
        engine_trace!(SOURCE, "Bound shader '{}'", self.name);
        Ok(())
    }
}

impl std::fmt::Debug for Shader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader")
            .field("name", &self.name)
            .field("program", &self.program)
            .field("generation", &self.generation())
            .finish()
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
