//! Loads a small scene with dependencies from in-memory files, polling the
//! manager the way a frame loop would.
//!
//! Run with `RUST_LOG=debug` to watch the task lifecycle.

use std::sync::Arc;
use std::time::Duration;

use vesper_assets::{
    Asset, AssetDescriptor, AssetLoader, AssetManager, AssetResult, FileHandle, MemoryResolver,
};

#[derive(Debug)]
struct Sprite {
    name: String,
    bytes: usize,
}

impl Asset for Sprite {
    fn dispose(&self) {
        println!("disposing sprite '{}'", self.name);
    }
}

struct SpriteLoader;

impl AssetLoader for SpriteLoader {
    type Asset = Sprite;
    type Params = ();

    fn load(&self, name: &str, file: &FileHandle, _: Option<&()>) -> AssetResult<Sprite> {
        // Stand-in for real image decoding.
        std::thread::sleep(Duration::from_millis(30));
        let bytes = file.read()?;
        Ok(Sprite {
            name: name.to_string(),
            bytes: bytes.len(),
        })
    }
}

#[derive(Debug)]
struct Level {
    sprites: Vec<String>,
}

impl Asset for Level {}

struct LevelLoader;

impl AssetLoader for LevelLoader {
    type Asset = Level;
    type Params = ();

    fn dependencies(&self, _: &str, file: &FileHandle, _: Option<&()>) -> Vec<AssetDescriptor> {
        sprite_names(file)
            .into_iter()
            .map(AssetDescriptor::new::<Sprite>)
            .collect()
    }

    fn load(&self, _: &str, file: &FileHandle, _: Option<&()>) -> AssetResult<Level> {
        Ok(Level {
            sprites: sprite_names(file),
        })
    }
}

fn sprite_names(file: &FileHandle) -> Vec<String> {
    let Ok(bytes) = file.read() else {
        return Vec::new();
    };
    String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect()
}

fn main() -> AssetResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let resolver = MemoryResolver::new();
    resolver.insert("level1.lvl", b"hero.png\ntiles.png".to_vec());
    resolver.insert("hero.png", Arc::<[u8]>::from(&[0u8; 512][..]));
    resolver.insert("tiles.png", Arc::<[u8]>::from(&[0u8; 2048][..]));

    let manager = AssetManager::new(resolver);
    manager.set_loader(SpriteLoader);
    manager.set_loader(LevelLoader);

    manager.load::<Level>("level1.lvl")?;

    // Frame loop: advance loading a bit, then do other work.
    while !manager.update()? {
        println!("loading... {:.0}%", manager.progress() * 100.0);
        std::thread::sleep(Duration::from_millis(10));
    }

    let level = manager.get::<Level>("level1.lvl")?;
    println!("level ready with sprites {:?}", level.sprites);
    for name in &level.sprites {
        let sprite = manager.get::<Sprite>(name)?;
        println!("  {} ({} bytes)", sprite.name, sprite.bytes);
    }

    print!("{}", manager.diagnostics());

    manager.unload("level1.lvl")?;
    println!("loaded assets after unload: {}", manager.loaded_count());
    Ok(())
}
