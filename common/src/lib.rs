/*
Copyright 2020 Google LLC

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    https://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Shared data model for the solder compiler: type references, annotations,
//! keys, scopes, and the program-model facade the compiler consumes.

pub mod annotation;
pub mod key;
pub mod manifest;
pub mod model;
pub mod scope;
pub mod type_data;
