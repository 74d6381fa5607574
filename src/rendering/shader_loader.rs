use std::{
    path::Path,
    sync::{
        mpsc::{self, channel},
        Arc, RwLock,
    },
    time::Duration,
};

use anyhow::Context;
use id_arena::{Arena, Id};
use naga::{
    back::wgsl::WriterFlags,
    valid::{Capabilities, ValidationFlags},
};
use naga_oil::compose::{
    ComposableModuleDescriptor, Composer, NagaModuleDescriptor, ShaderLanguage,
};
use notify_debouncer_mini::{
    new_debouncer_opt, notify::*, DebounceEventResult, DebouncedEventKind, Debouncer,
};
use pollster::block_on;
use wgpu::{naga, PollType, RenderPipeline};

const SHADER_FOLDER: &str = "assets/shaders";
const SHARED_SHADER_MODULES_FOLDER: &str = "assets/shaders/shared";

type PipelineFactory = Box<
    dyn Sync
        + Send
        + Fn(&wgpu::Device, &ShaderDefinition, &str) -> anyhow::Result<wgpu::RenderPipeline>,
>;

#[derive(Debug, Clone)]
pub(crate) struct ShaderDefinition {
    pub name: &'static str,
    pub path: &'static str,
}

pub struct ShaderEntry {
    pipeline_id: PipelineId,
    def: ShaderDefinition,
    factory: PipelineFactory,
}

impl ShaderEntry {
    pub fn new(pipeline_id: PipelineId, def: ShaderDefinition, factory: PipelineFactory) -> Self {
        Self {
            pipeline_id,
            def,
            factory,
        }
    }
}

pub type PipelineId = Id<PipelineCacheEntry>;

#[derive(Default)]
pub struct PipelineCacheEntry(Option<wgpu::RenderPipeline>);

impl PipelineCacheEntry {
    pub fn set_pipeline(&mut self, pipeline: wgpu::RenderPipeline) {
        self.0 = Some(pipeline);
    }
}

pub struct PipelineCacheBuilder {
    shaders: Arena<ShaderEntry>,
    pipelines: Arena<PipelineCacheEntry>,
}

impl PipelineCacheBuilder {
    pub fn new() -> Self {
        Self {
            shaders: Arena::new(),
            pipelines: Arena::new(),
        }
    }

    pub fn add_shader(
        &mut self,
        shader_def: ShaderDefinition,
        factory: PipelineFactory,
    ) -> PipelineId {
        let pipeline_id = self.pipelines.alloc(PipelineCacheEntry::default());
        let shader_entry = ShaderEntry::new(pipeline_id, shader_def, factory);
        self.shaders.alloc(shader_entry);
        pipeline_id
    }

    pub fn build(self) -> PipelineCache {
        PipelineCache {
            shaders: Arc::new(self.shaders),
            pipelines: self.pipelines,
        }
    }
}

pub struct PipelineCache {
    shaders: Arc<Arena<ShaderEntry>>,
    pipelines: Arena<PipelineCacheEntry>,
}

impl PipelineCache {
    /// `None` only before the first successful compile of the shader.
    pub fn get(&self, id: PipelineId) -> Option<&RenderPipeline> {
        self.pipelines.get(id).and_then(|entry| entry.0.as_ref())
    }

    pub fn get_entry_mut(&mut self, id: PipelineId) -> Option<&mut PipelineCacheEntry> {
        self.pipelines.get_mut(id)
    }

    pub fn iter_shaders_and_pipelines_mut(
        &mut self,
    ) -> impl Iterator<Item = (&ShaderEntry, &mut PipelineCacheEntry)> {
        // Both arenas are only ever appended to together in add_shader, so
        // their order matches.
        self.shaders
            .iter()
            .map(|(_, shader_entry)| shader_entry)
            .zip(
                self.pipelines
                    .iter_mut()
                    .map(|(_, pipeline_entry)| pipeline_entry),
            )
    }
}

// Compiles every pipeline up front, then recompiles them on a watcher thread
// when their shader files change.
pub(crate) struct ShaderLoader {
    pub cache: PipelineCache,
    device: wgpu::Device,
    receiver: mpsc::Receiver<ReloadedPipeline>,
    composer: Arc<RwLock<Composer>>,
    _debouncer: Debouncer<notify_debouncer_mini::notify::RecommendedWatcher>,
}

impl ShaderLoader {
    pub fn new(device: wgpu::Device, cache_builder: PipelineCacheBuilder) -> anyhow::Result<Self> {
        let cache = cache_builder.build();

        let (send_new_pipelines, recv_new_pipelines) = channel();

        let composer = create_composer().context("Failed to create shader composer")?;
        let composer = Arc::new(RwLock::new(composer));

        let watched = WatchedShaders {
            device: device.clone(),
            shaders: cache.shaders.clone(),
            composer: composer.clone(),
            sender: send_new_pipelines,
        };
        let mut debouncer = new_debouncer_opt(
            notify_debouncer_mini::Config::default().with_timeout(Duration::from_millis(100)),
            move |res: DebounceEventResult| match res {
                Ok(events) => events
                    .iter()
                    .filter(|event| event.kind == DebouncedEventKind::Any)
                    .for_each(|event| watched.on_file_changed(&event.path)),
                Err(e) => log::error!("Error debouncing shader changes: {}", e),
            },
        )
        .context("Failed to create shader file watcher")?;

        let absolute_shader_folder = Path::new(SHADER_FOLDER)
            .canonicalize()
            .with_context(|| format!("Shader folder {} not found", SHADER_FOLDER))?;

        debouncer
            .watcher()
            .watch(&absolute_shader_folder, RecursiveMode::Recursive)
            .context("Failed to watch shader folder")?;

        let mut shader_loader = Self {
            device,
            cache,
            receiver: recv_new_pipelines,
            composer,
            _debouncer: debouncer,
        };

        shader_loader.create_all_pipelines()?;

        Ok(shader_loader)
    }

    pub(crate) fn create_all_pipelines(&mut self) -> anyhow::Result<()> {
        for (shader, pipeline_entry) in self.cache.iter_shaders_and_pipelines_mut() {
            let pipeline = compile_file(
                &self.device,
                &shader.def,
                &shader.factory,
                self.composer.clone(),
            )
            .with_context(|| format!("Failed to compile shader: {}", shader.def.name))?;
            pipeline_entry.set_pipeline(pipeline);
            log::debug!("Compiled shader {}", shader.def.name);
        }
        Ok(())
    }

    pub(crate) fn load_pending_shaders(&mut self) -> anyhow::Result<()> {
        while let Ok((name, pipeline_id, pipeline)) = self.receiver.try_recv() {
            let entry = self
                .cache
                .get_entry_mut(pipeline_id)
                .with_context(|| format!("Unknown pipeline for shader {}", name))?;
            log::info!("Shader reloaded: {}", name);
            entry.set_pipeline(pipeline);
        }

        Ok(())
    }
}

type ReloadedPipeline = (&'static str, PipelineId, wgpu::RenderPipeline);

/// State moved into the file watcher callback.
struct WatchedShaders {
    device: wgpu::Device,
    shaders: Arc<Arena<ShaderEntry>>,
    composer: Arc<RwLock<Composer>>,
    sender: mpsc::Sender<ReloadedPipeline>,
}

impl WatchedShaders {
    fn on_file_changed(&self, path: &Path) {
        if is_shared_module(path) {
            // Every pipeline may import the shared module
            if let Err(e) = self.reload_shared_module(path) {
                log::error!("Failed to reload shared shader module: {:?}", e);
                return;
            }
            self.shaders
                .iter()
                .for_each(|(_, entry)| self.recompile(entry));
        } else if let Some((_, entry)) = self
            .shaders
            .iter()
            .find(|(_, entry)| path.ends_with(entry.def.path))
        {
            self.recompile(entry);
        }
    }

    fn reload_shared_module(&self, path: &Path) -> anyhow::Result<()> {
        let mut composer = self
            .composer
            .write()
            .map_err(|_| anyhow::anyhow!("Shader composer lock poisoned"))?;
        add_shared_module(&mut composer, path)
    }

    fn recompile(&self, entry: &ShaderEntry) {
        match compile_file(&self.device, &entry.def, &entry.factory, self.composer.clone()) {
            Ok(pipeline) => {
                if self
                    .sender
                    .send((entry.def.name, entry.pipeline_id, pipeline))
                    .is_err()
                {
                    log::debug!("Shader loader is gone, dropping {}", entry.def.name);
                }
            }
            Err(e) => log::error!("Failed to reload shader {}: {:?}", entry.def.name, e),
        }
    }
}

fn is_shared_module(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "wgsl")
        && path
            .parent()
            .is_some_and(|parent| parent.ends_with(SHARED_SHADER_MODULES_FOLDER))
}

fn compile_file(
    device: &wgpu::Device,
    shader_def: &ShaderDefinition,
    factory: &PipelineFactory,
    composer: Arc<RwLock<Composer>>,
) -> anyhow::Result<wgpu::RenderPipeline> {
    let path = Path::new(SHADER_FOLDER).join(shader_def.path);
    let shader_code = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read shader file {}", path.display()))?;

    let file_path = path.to_string_lossy().to_string();

    let module = {
        let mut composer = composer
            .write()
            .map_err(|_| anyhow::anyhow!("Shader composer lock poisoned"))?;

        composer
            .make_naga_module(NagaModuleDescriptor {
                file_path: &file_path,
                source: &shader_code,
                ..Default::default()
            })
            .with_context(|| format!("Failed to compose {}", file_path))?
    };

    // wgpu validates again when creating the module
    let validation_flags = ValidationFlags::empty();
    let info = naga::valid::Validator::new(validation_flags, Capabilities::all())
        .validate(&module)
        .context("Failed to validate Naga module")?;

    let shader_code = naga::back::wgsl::write_string(&module, &info, WriterFlags::empty())
        .context("Failed to convert Naga module to WGSL string")?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let pipeline = factory(device, shader_def, &shader_code);

    device
        .poll(PollType::Wait)
        .context("Failed to poll device after shader compilation")?;

    if let Some(error) = block_on(device.pop_error_scope()) {
        anyhow::bail!(
            "Shader compilation failed for {}: {}",
            shader_def.name,
            error
        );
    }

    pipeline
}

fn create_composer() -> anyhow::Result<Composer> {
    let mut shared_files = std::fs::read_dir(SHARED_SHADER_MODULES_FOLDER)
        .with_context(|| format!("Failed to read {}", SHARED_SHADER_MODULES_FOLDER))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .context("Failed to list shared shader modules")?;
    // Modules must be added after the modules they import
    shared_files.sort();

    let mut composer = Composer::default();

    for path in shared_files {
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "wgsl") {
            continue;
        }
        add_shared_module(&mut composer, &path)?;
    }

    Ok(composer)
}

/// Adds a module, replacing any earlier version with the same import path.
fn add_shared_module(composer: &mut Composer, path: &Path) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read shared shader module {}", path.display()))?;

    let file_path = path.to_string_lossy().to_string();

    composer
        .add_composable_module(ComposableModuleDescriptor {
            source: &source,
            file_path: &file_path,
            language: ShaderLanguage::Wgsl,
            ..Default::default()
        })
        .with_context(|| format!("Failed to add shared shader module: {}", file_path))?;

    log::debug!("Added shared shader module {}", file_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_modules_are_recognised() {
        let shared = Path::new("/work/wonderland/assets/shaders/shared/common.wgsl");
        let main = Path::new("/work/wonderland/assets/shaders/lit.wgsl");
        let backup = Path::new("/work/wonderland/assets/shaders/shared/common.wgsl~");

        assert!(is_shared_module(shared));
        assert!(!is_shared_module(main));
        assert!(!is_shared_module(backup));
    }
}
