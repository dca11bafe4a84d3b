// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;

use logkeep::Config;

fn main() {
    let config = Config {
        errors: std::env::temp_dir().join("logkeep-demo"),
        debug: false,
        ..Config::default()
    };
    config.install_backend().unwrap();
    logkeep::init(&config).unwrap();

    let logger = logkeep::logger("demo");
    logger.info("reading settings");

    if let Err(err) = fs::read_to_string("/definitely/not/here.toml") {
        if let Some(id) = logger.error_with("failed to read settings", &err) {
            logger.info(format_args!("reference {id} when reporting this problem"));
        }
    }

    let _: Option<()> = logkeep::run(|| panic!("background job crashed"));

    for id in logkeep::errors().list().unwrap() {
        let archived = logkeep::errors().read(id).unwrap();
        println!("{id}: {archived}");
    }
    logkeep::errors().clear().unwrap();
}
